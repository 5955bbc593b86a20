use crate::messages::{Effect, Update};
use crate::page::State;

/// Outcome of folding one update into the state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fold {
    /// Whether the state was modified and observers need a fresh snapshot
    pub changed: bool,
    pub effect: Option<Effect>,
}

impl Fold {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            effect: None,
        }
    }

    fn effect(effect: Effect) -> Self {
        Self {
            changed: false,
            effect: Some(effect),
        }
    }
}

/// Fold `update` into `state`.
///
/// Updates tagged with a document generation other than the current one
/// are dropped, except that a newer page list always replaces an older one.
pub fn reduce(state: &mut State, update: Update) -> Fold {
    match update {
        Update::NoOp => Fold::unchanged(),
        Update::Pages { generation, pages } => {
            if generation < state.generation() {
                log::debug!(
                    "Dropping page list of generation {} (current {})",
                    generation,
                    state.generation()
                );
                return Fold::unchanged();
            }
            state.replace_pages(generation, pages);
            Fold::changed()
        }
        Update::Page { generation, page } => {
            if generation != state.generation() {
                log::debug!(
                    "Dropping stale page {} of generation {} (current {})",
                    page.number,
                    generation,
                    state.generation()
                );
                return Fold::unchanged();
            }
            let number = page.number;
            if state.replace_page(page) {
                Fold::changed()
            } else {
                log::warn!(
                    "Page {} is outside the document ({} pages)",
                    number,
                    state.page_count()
                );
                Fold::unchanged()
            }
        }
        Update::ShowFileSystem { mime_types } => {
            Fold::effect(Effect::ShowFileSystem { mime_types })
        }
        Update::MoveToPage { generation, page } => {
            if generation == state.generation() {
                Fold::effect(Effect::MoveToPage { page })
            } else {
                Fold::unchanged()
            }
        }
        Update::Error {
            generation,
            message,
        } => match generation {
            Some(generation) if generation != state.generation() => Fold::unchanged(),
            _ => Fold::effect(Effect::ShowError { message }),
        },
    }
}
