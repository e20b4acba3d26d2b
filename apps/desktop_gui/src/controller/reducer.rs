//! Reducer-style navigation state for the kiosk screens.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Form,
    List,
    About,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Beranda",
            Self::Form => "Isi Buku Tamu",
            Self::List => "Data Tamu",
            Self::About => "Tentang",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub view: View,
    pub submitting: bool,
    /// Set while the success overlay is showing.
    pub success_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Navigate(View),
    SubmitStarted,
    SubmitRejected,
    SubmitCompleted { message: String },
    DismissSuccess,
}

impl NavigationState {
    pub fn is_locked(&self) -> bool {
        self.submitting || self.success_message.is_some()
    }
}

pub fn reduce(state: &NavigationState, action: NavAction) -> NavigationState {
    let mut next = state.clone();
    match action {
        NavAction::Navigate(view) => {
            if state.success_message.is_none() {
                next.view = view;
            }
        }
        NavAction::SubmitStarted => {
            if state.view == View::Form && !state.is_locked() {
                next.submitting = true;
            }
        }
        NavAction::SubmitRejected => {
            next.submitting = false;
            next.view = View::Form;
        }
        NavAction::SubmitCompleted { message } => {
            if state.submitting {
                next.submitting = false;
                next.success_message = Some(message);
            }
        }
        NavAction::DismissSuccess => {
            if state.success_message.is_some() {
                next.success_message = None;
                next.view = View::List;
            }
        }
    }
    next
}

/// True when the transition moves away from the form, which must release
/// the camera and discard the draft.
pub fn left_form(before: &NavigationState, after: &NavigationState) -> bool {
    before.view == View::Form && after.view != View::Form
}
