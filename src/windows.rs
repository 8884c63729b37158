//! Window ownership for the dock and settings windows.
//!
//! At most one window exists per [`WindowRole`]. Asking for a role that is
//! already open focuses it instead of opening a second one.

/// The windows the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowRole {
    /// The floating dock
    Main,
    /// The shortcut editor
    Settings,
}

/// What the manager needs from a toolkit window handle.
pub trait ManagedWindow {
    fn focus(&self);

    /// Whether the user or the toolkit has closed the window.
    fn is_closed(&self) -> bool;
}

/// Holds the live window for each role.
#[derive(Debug)]
pub struct WindowManager<W> {
    main: Option<W>,
    settings: Option<W>,
}

impl<W> Default for WindowManager<W> {
    fn default() -> Self {
        Self {
            main: None,
            settings: None,
        }
    }
}

impl<W: ManagedWindow> WindowManager<W> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, role: WindowRole) -> &Option<W> {
        match role {
            WindowRole::Main => &self.main,
            WindowRole::Settings => &self.settings,
        }
    }

    fn slot_mut(&mut self, role: WindowRole) -> &mut Option<W> {
        match role {
            WindowRole::Main => &mut self.main,
            WindowRole::Settings => &mut self.settings,
        }
    }

    /// Focus the window for `role`, or build one with `create` if none is open.
    pub fn create_or_focus<F>(&mut self, role: WindowRole, create: F) -> &W
    where
        F: FnOnce() -> W,
    {
        let slot = self.slot_mut(role);
        if slot.as_ref().is_some_and(|w| w.is_closed()) {
            *slot = None;
        }

        if let Some(window) = slot.as_ref() {
            tracing::debug!(?role, "Window already open, focusing");
            window.focus();
        } else {
            tracing::debug!(?role, "Creating window");
        }
        slot.get_or_insert_with(create)
    }

    /// The open window for `role`, if any.
    pub fn get(&self, role: WindowRole) -> Option<&W> {
        self.slot(role).as_ref().filter(|w| !w.is_closed())
    }

    /// Forget the window for `role` and hand it back.
    pub fn close(&mut self, role: WindowRole) -> Option<W> {
        self.slot_mut(role).take()
    }
}
