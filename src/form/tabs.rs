/// Who owns the active tab index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabControl {
    /// The host owns the index and applies changes through [`TabNavigator::sync`].
    Controlled(usize),
    /// The navigator owns the index, starting at `initial`.
    Uncontrolled { initial: usize },
}

impl Default for TabControl {
    fn default() -> Self {
        TabControl::Uncontrolled { initial: 0 }
    }
}

/// Requested tab switch, reported to the host in both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabChange {
    pub from: usize,
    pub to: usize,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct TabNavigator {
    ids: Vec<String>,
    active: usize,
    controlled: bool,
}

impl TabNavigator {
    pub fn new(ids: Vec<String>, control: TabControl) -> Self {
        let (active, controlled) = match control {
            TabControl::Controlled(index) => (index, true),
            TabControl::Uncontrolled { initial } => (initial, false),
        };
        let mut navigator = Self {
            ids,
            active: 0,
            controlled,
        };
        navigator.active = navigator.clamp(active);
        navigator
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_id(&self) -> Option<&str> {
        self.ids.get(self.active).map(String::as_str)
    }

    /// Requests a switch. Uncontrolled navigators apply it at once; controlled
    /// ones only report it and wait for `sync`.
    pub fn select(&mut self, index: usize) -> Option<TabChange> {
        if index >= self.ids.len() || index == self.active {
            return None;
        }
        let change = TabChange {
            from: self.active,
            to: index,
            id: self.ids[index].clone(),
        };
        if !self.controlled {
            self.active = index;
        }
        Some(change)
    }

    pub fn select_id(&mut self, id: &str) -> Option<TabChange> {
        let index = self.ids.iter().position(|candidate| candidate == id)?;
        self.select(index)
    }

    /// Wrapping relative move.
    pub fn step(&mut self, delta: i32) -> Option<TabChange> {
        if self.ids.is_empty() {
            return None;
        }
        let len = self.ids.len() as i64;
        let next = (self.active as i64 + i64::from(delta)).rem_euclid(len);
        self.select(next as usize)
    }

    /// Applies a host-owned index.
    pub fn sync(&mut self, index: usize) {
        self.active = self.clamp(index);
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.ids.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        vec!["general".into(), "content".into(), "advanced".into()]
    }

    #[test]
    fn uncontrolled_applies_changes() {
        let mut nav = TabNavigator::new(ids(), TabControl::default());
        let change = nav.select(2).unwrap();
        assert_eq!(change.id, "advanced");
        assert_eq!(nav.active_index(), 2);
        assert!(nav.select(2).is_none());
    }

    #[test]
    fn controlled_waits_for_sync() {
        let mut nav = TabNavigator::new(ids(), TabControl::Controlled(1));
        let change = nav.step(1).unwrap();
        assert_eq!(change.to, 2);
        assert_eq!(nav.active_index(), 1);
        nav.sync(change.to);
        assert_eq!(nav.active_id(), Some("advanced"));
    }

    #[test]
    fn step_wraps_both_ways() {
        let mut nav = TabNavigator::new(ids(), TabControl::default());
        nav.step(-1);
        assert_eq!(nav.active_index(), 2);
        nav.step(1);
        assert_eq!(nav.active_index(), 0);
    }

    #[test]
    fn extreme_steps_wrap_without_overflow() {
        let mut nav = TabNavigator::new(ids(), TabControl::default());
        nav.select(2);
        nav.step(i32::MAX);
        assert_eq!(nav.active_index(), (2 + i32::MAX as usize) % 3);
        nav.step(i32::MIN);
        assert!(nav.active_index() < 3);
    }

    #[test]
    fn out_of_range_indices_are_clamped_or_ignored() {
        let mut nav = TabNavigator::new(ids(), TabControl::Controlled(9));
        assert_eq!(nav.active_index(), 2);
        assert!(nav.select(7).is_none());
        assert!(nav.select_id("missing").is_none());
    }
}
