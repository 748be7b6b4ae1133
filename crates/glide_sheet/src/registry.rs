//! Coexisting sheets
//!
//! A host with several sheets (one per route, say) keeps them in a
//! [`SheetRegistry`]. Each sheet has its own motion state and content map,
//! so reports for one key never touch another.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::config::SheetConfig;
use crate::content::InstanceKey;
use crate::controller::{SheetController, SheetHandle};
use crate::error::{Result, SheetError};

slotmap::new_key_type! {
    /// Identifies a mounted sheet
    pub struct SheetId;
}

#[derive(Debug, Default)]
pub struct SheetRegistry {
    sheets: SlotMap<SheetId, SheetController>,
    keys: FxHashMap<InstanceKey, SheetId>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sheet under `key`
    pub fn mount(&mut self, key: impl Into<InstanceKey>, config: SheetConfig) -> Result<SheetId> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(SheetError::DuplicateSheet(key.to_string()));
        }
        let controller = SheetController::new(key.clone(), config)?;
        let id = self.sheets.insert(controller);
        tracing::debug!("mounted sheet '{}'", key);
        self.keys.insert(key, id);
        Ok(id)
    }

    /// Tear down the sheet under `key`; its handles go inert
    pub fn unmount(&mut self, key: &InstanceKey) -> bool {
        let Some(id) = self.keys.remove(key) else {
            return false;
        };
        tracing::debug!("unmounting sheet '{}'", key);
        self.sheets.remove(id).is_some()
    }

    /// Move the sheet under `from` to `to`, retiring its old content heights
    ///
    /// Returns `Ok(false)` when nothing is mounted under `from`.
    pub fn rekey(&mut self, from: &InstanceKey, to: impl Into<InstanceKey>) -> Result<bool> {
        let to = to.into();
        if from == &to {
            return Ok(self.keys.contains_key(from));
        }
        if self.keys.contains_key(&to) {
            return Err(SheetError::DuplicateSheet(to.to_string()));
        }
        let Some(id) = self.keys.remove(from) else {
            return Ok(false);
        };
        if let Some(sheet) = self.sheets.get(id) {
            sheet.set_instance_key(to.clone());
        }
        self.keys.insert(to, id);
        Ok(true)
    }

    /// The sheet under `key`
    ///
    /// Change a registered sheet's key with [`rekey`](Self::rekey); calling
    /// `set_instance_key` on the returned controller leaves it registered
    /// under the old key.
    pub fn get(&self, key: &InstanceKey) -> Option<&SheetController> {
        self.keys.get(key).and_then(|id| self.sheets.get(*id))
    }

    pub fn by_id(&self, id: SheetId) -> Option<&SheetController> {
        self.sheets.get(id)
    }

    pub fn handle(&self, key: &InstanceKey) -> Option<SheetHandle> {
        self.get(key).map(SheetController::handle)
    }

    /// Advance every sheet; returns `true` while any is settling
    pub fn tick_all(&self, dt: f32) -> bool {
        self.sheets
            .values()
            .fold(false, |moving, sheet| sheet.tick(dt) || moving)
    }

    pub fn keys(&self) -> impl Iterator<Item = &InstanceKey> {
        self.keys.keys()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnapPoint;
    use crate::content::ContentRegion;
    use crate::layout::ContainerLayout;

    fn config() -> SheetConfig {
        SheetConfig::new([SnapPoint::Percent(50.0)]).dynamic_sizing(true)
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut registry = SheetRegistry::new();
        registry.mount("a", config()).unwrap();
        assert!(matches!(
            registry.mount("a", config()),
            Err(SheetError::DuplicateSheet(key)) if key == "a"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sheets_do_not_share_content() {
        let mut registry = SheetRegistry::new();
        registry.mount("a", config()).unwrap();
        registry.mount("b", config()).unwrap();
        let a = InstanceKey::new("a");
        let b = InstanceKey::new("b");

        for key in [&a, &b] {
            registry
                .get(key)
                .unwrap()
                .set_layout(ContainerLayout::new(800.0));
        }
        registry
            .handle(&a)
            .unwrap()
            .report_content_height(ContentRegion::Body, 200.0);

        assert_eq!(registry.get(&a).unwrap().table().positions(), &[600.0, 400.0]);
        assert_eq!(registry.get(&b).unwrap().table().positions(), &[400.0]);
    }

    #[test]
    fn test_unmount_makes_handles_inert() {
        let mut registry = SheetRegistry::new();
        registry.mount("a", config()).unwrap();
        let key = InstanceKey::new("a");
        let handle = registry.handle(&key).unwrap();

        assert!(registry.unmount(&key));
        assert!(!registry.unmount(&key));
        assert!(!handle.is_alive());
        assert_eq!(handle.expand(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rekey_moves_sheet_and_drops_old_heights() {
        let mut registry = SheetRegistry::new();
        registry.mount("a", config()).unwrap();
        registry.mount("b", config()).unwrap();
        let a = InstanceKey::new("a");
        let sheet = registry.get(&a).unwrap();
        sheet.set_layout(ContainerLayout::new(800.0));
        sheet.report_content_height(ContentRegion::Body, 200.0);
        assert_eq!(sheet.table().positions(), &[600.0, 400.0]);

        assert!(matches!(
            registry.rekey(&a, "b"),
            Err(SheetError::DuplicateSheet(key)) if key == "b"
        ));
        assert!(registry.rekey(&a, "c").unwrap());
        assert!(!registry.rekey(&a, "d").unwrap());

        assert!(registry.get(&a).is_none());
        let moved = registry.get(&InstanceKey::new("c")).unwrap();
        assert_eq!(moved.instance_key(), InstanceKey::new("c"));
        assert_eq!(moved.table().positions(), &[400.0]);
        assert!(!moved.content().contains_instance(&a));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_tick_all_reports_motion() {
        let mut registry = SheetRegistry::new();
        registry.mount("a", config()).unwrap();
        registry
            .get(&InstanceKey::new("a"))
            .unwrap()
            .set_layout(ContainerLayout::new(800.0));

        assert!(registry.tick_all(1.0 / 60.0));
        let mut frames = 0;
        while registry.tick_all(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 600);
        }
        assert_eq!(registry.get(&InstanceKey::new("a")).unwrap().snapshot().current_index, 0);
    }
}
