use crate::errors::StoreError;

use super::profile::StyleProfile;

/// The persistence contract for named custom styles. The store validates
/// its invariants synchronously before calling any of these; the remote
/// implementation lives in the engine crate.
pub trait ProfileService {
    fn fetch_all(&mut self) -> Result<Vec<StyleProfile>, StoreError>;
    fn create(&mut self, profile: &StyleProfile) -> Result<(), StoreError>;
    fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// In-memory service for offline composing and tests.
#[derive(Debug, Default)]
pub struct MemoryProfileService {
    profiles: Vec<StyleProfile>,
    fail_next: Option<StoreError>,
}

impl MemoryProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<StyleProfile>) -> Self {
        Self {
            profiles,
            fail_next: None,
        }
    }

    /// Make the next mutation fail with the given error, then recover.
    /// Lets tests exercise the transient-failure paths without a network;
    /// `fetch_all` is unaffected so a freshly wired store can still load.
    pub fn fail_next(&mut self, error: StoreError) {
        self.fail_next = Some(error);
    }

    fn take_failure(&mut self) -> Result<(), StoreError> {
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.profiles
            .iter()
            .position(|profile| profile.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl ProfileService for MemoryProfileService {
    fn fetch_all(&mut self) -> Result<Vec<StyleProfile>, StoreError> {
        Ok(self.profiles.clone())
    }

    fn create(&mut self, profile: &StyleProfile) -> Result<(), StoreError> {
        self.take_failure()?;
        if self.profiles.iter().any(|entry| entry.id == profile.id) {
            return Err(StoreError::Validation(format!(
                "duplicate profile id: {}",
                profile.id
            )));
        }
        self.profiles.push(profile.clone());
        Ok(())
    }

    fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        self.take_failure()?;
        let position = self.position(id)?;
        self.profiles[position].name = name.to_string();
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.take_failure()?;
        let position = self.position(id)?;
        self.profiles.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::StoreError;
    use crate::style::TagSelection;

    use super::{MemoryProfileService, ProfileService, StyleProfile};

    #[test]
    fn memory_service_round_trips_profiles() {
        let mut service = MemoryProfileService::new();
        let profile = StyleProfile::new("Zen", TagSelection::new(), TagSelection::new());

        service.create(&profile).unwrap();
        service.rename(&profile.id, "Calm").unwrap();
        let fetched = service.fetch_all().unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].name, "Calm");

        service.delete(&profile.id).unwrap();
        assert!(service.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn memory_service_reports_missing_ids() {
        let mut service = MemoryProfileService::new();
        assert!(matches!(
            service.rename("ghost", "x"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("ghost"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn injected_failure_fires_once_then_recovers() {
        let mut service = MemoryProfileService::new();
        service.fail_next(StoreError::Transient("connection reset".to_string()));
        let profile = StyleProfile::new("Zen", TagSelection::new(), TagSelection::new());

        assert!(matches!(
            service.create(&profile),
            Err(StoreError::Transient(_))
        ));
        service.create(&profile).unwrap();
        assert_eq!(service.fetch_all().unwrap().len(), 1);
    }
}
