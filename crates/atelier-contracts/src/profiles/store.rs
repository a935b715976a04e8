use crate::errors::StoreError;
use crate::style::TagSelection;

use super::profile::{normalize_name, StyleProfile};
use super::service::ProfileService;

pub const PAGE_SIZE: usize = 5;

/// One materialized page of the profile listing. Items are cloned out;
/// nothing here aliases store internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePage {
    pub items: Vec<StyleProfile>,
    pub total_count: usize,
    pub page: usize,
    pub page_count: usize,
}

/// Paginated CRUD over named custom styles, backed by a [`ProfileService`].
///
/// Invariants are validated synchronously before any service call, and the
/// local list only changes after the service confirms — a failed call never
/// leaves the store half-mutated. The current page is re-clamped on every
/// mutation so it always sits in `[1, page_count]`.
pub struct ProfileStore {
    service: Box<dyn ProfileService>,
    profiles: Vec<StyleProfile>,
    current_page: usize,
}

impl ProfileStore {
    pub fn new(mut service: Box<dyn ProfileService>) -> Result<Self, StoreError> {
        let profiles = service.fetch_all()?;
        Ok(Self {
            service,
            profiles,
            current_page: 1,
        })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.profiles.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn get(&self, id: &str) -> Option<&StyleProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// The requested page, clamped into range. Does not move the cursor.
    pub fn list(&self, page: usize) -> ProfilePage {
        let page_count = self.page_count();
        let page = clamp_page(page, page_count);
        let start = (page - 1) * PAGE_SIZE;
        let items = self
            .profiles
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        ProfilePage {
            items,
            total_count: self.profiles.len(),
            page,
            page_count,
        }
    }

    pub fn current(&self) -> ProfilePage {
        self.list(self.current_page)
    }

    pub fn select_page(&mut self, page: usize) -> ProfilePage {
        self.current_page = clamp_page(page, self.page_count());
        self.current()
    }

    /// Save the given selections under `name`. New profiles append at the
    /// tail, so a sixth profile lands on page two.
    pub fn create(
        &mut self,
        name: &str,
        positive: TagSelection,
        negative: TagSelection,
    ) -> Result<StyleProfile, StoreError> {
        let name = normalize_name(name)?;
        let profile = StyleProfile::new(name, positive, negative);
        self.service.create(&profile)?;
        self.profiles.push(profile.clone());
        Ok(profile)
    }

    pub fn update(&mut self, id: &str, name: &str) -> Result<StyleProfile, StoreError> {
        let name = normalize_name(name)?;
        let position = self.position(id)?;
        self.service.rename(id, &name)?;
        self.profiles[position].name = name;
        Ok(self.profiles[position].clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let position = self.position(id)?;
        self.service.delete(id)?;
        self.profiles.remove(position);
        self.current_page = clamp_page(self.current_page, self.page_count());
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.profiles
            .iter()
            .position(|profile| profile.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count)
}

#[cfg(test)]
mod tests {
    use crate::errors::StoreError;
    use crate::profiles::MemoryProfileService;
    use crate::style::TagSelection;

    use super::{ProfileStore, PAGE_SIZE};

    fn store_with(count: usize) -> ProfileStore {
        let mut store = ProfileStore::new(Box::new(MemoryProfileService::new())).unwrap();
        for index in 0..count {
            store
                .create(&format!("Style {index}"), TagSelection::new(), TagSelection::new())
                .unwrap();
        }
        store
    }

    #[test]
    fn empty_store_still_has_one_page() {
        let store = store_with(0);
        let page = store.current();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn sixth_profile_lands_on_page_two() {
        let mut store = store_with(PAGE_SIZE);
        assert_eq!(store.page_count(), 1);

        let zen = store
            .create("Zen", TagSelection::new(), TagSelection::new())
            .unwrap();
        assert_eq!(store.page_count(), 2);
        let first = store.list(1);
        assert_eq!(first.items.len(), PAGE_SIZE);
        assert!(first.items.iter().all(|profile| profile.id != zen.id));
        let second = store.list(2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, zen.id);
    }

    #[test]
    fn out_of_range_pages_clamp_to_the_last_valid_page() {
        let store = store_with(7);
        let page = store.list(9);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 2);
        let page = store.list(0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn blank_name_fails_validation_and_leaves_the_count_unchanged() {
        let mut store = store_with(2);
        let result = store.create(" ", TagSelection::new(), TagSelection::new());
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn deleting_the_last_item_of_the_last_page_clamps_the_cursor() {
        let mut store = store_with(PAGE_SIZE + 1);
        store.select_page(2);
        let lone = store.current().items[0].clone();

        store.delete(&lone.id).unwrap();
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.current().items.len(), PAGE_SIZE);
    }

    #[test]
    fn update_renames_in_place_and_preserves_position() {
        let mut store = store_with(3);
        let middle = store.list(1).items[1].clone();

        let renamed = store.update(&middle.id, "  Renamed  ").unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(store.list(1).items[1].id, middle.id);
        assert_eq!(store.list(1).items[1].name, "Renamed");
    }

    #[test]
    fn update_and_delete_report_missing_ids() {
        let mut store = store_with(1);
        assert!(matches!(
            store.update("ghost", "x"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete("ghost"), Err(StoreError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_service_call_leaves_the_local_list_untouched() {
        use crate::profiles::StyleProfile;

        let zen = StyleProfile::new("Zen", TagSelection::new(), TagSelection::new());
        let mut service = MemoryProfileService::with_profiles(vec![zen.clone()]);
        service.fail_next(StoreError::Transient("timeout".to_string()));
        let mut store = ProfileStore::new(Box::new(service)).unwrap();

        let result = store.create("Later", TagSelection::new(), TagSelection::new());
        assert!(matches!(result, Err(StoreError::Transient(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current().items[0].name, "Zen");

        let result = store.delete(&zen.id);
        assert!(result.is_ok());
        assert!(store.is_empty());
    }
}
