/// Who is acting on an order: a registered user or an unauthenticated
/// guest keyed by their contact number until submission resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Registered(i64),
    Guest(String),
}

impl Identity {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Registered(id) => Some(*id),
            Identity::Guest(_) => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest(_))
    }
}
