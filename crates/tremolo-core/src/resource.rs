//! Tolerance for resources that resolve after the document moved on.
//!
//! Images decode and code blocks highlight asynchronously in the host.
//! The tracker hands out a ticket per request; when the result arrives
//! the ticket is only honored if the element still exists and no newer
//! request superseded it. Stale completions are dropped silently, so a
//! deleted or re-sourced element is never patched by an old load.

use std::collections::HashMap;

use log::debug;

use crate::element::{Element, ElementId};
use crate::workspace::Workspace;

/// A pending resource load for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    element_id: ElementId,
    generation: u64,
}

impl LoadTicket {
    pub fn element_id(&self) -> ElementId {
        self.element_id
    }
}

/// The result of a finished load, delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutcome {
    /// The image decoded; record its natural pixel size.
    ImageLoaded {
        natural_width: f64,
        natural_height: f64,
    },
    /// Syntax highlighting finished for a code block. `false` means the
    /// highlighter had no grammar for the language and the block renders
    /// as plain text.
    CodeHighlighted(bool),
}

/// Tracks outstanding loads and applies their outcomes.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    generations: HashMap<ElementId, u64>,
    next_generation: u64,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new load for an element, superseding any earlier one.
    pub fn begin_load(&mut self, element_id: ElementId) -> LoadTicket {
        self.next_generation += 1;
        self.generations.insert(element_id, self.next_generation);
        LoadTicket {
            element_id,
            generation: self.next_generation,
        }
    }

    /// Apply a finished load to the workspace. Returns true when the
    /// patch was applied, false when the ticket was stale or the element
    /// is gone.
    pub fn complete(
        &mut self,
        workspace: &mut Workspace,
        ticket: LoadTicket,
        outcome: ResourceOutcome,
    ) -> bool {
        if self.generations.get(&ticket.element_id) != Some(&ticket.generation) {
            debug!("dropping superseded load for {}", ticket.element_id);
            return false;
        }
        let Some(element) = workspace.get_mut(ticket.element_id) else {
            debug!("dropping load for deleted element {}", ticket.element_id);
            self.generations.remove(&ticket.element_id);
            return false;
        };
        self.generations.remove(&ticket.element_id);

        match (element, outcome) {
            (
                Element::Image(image),
                ResourceOutcome::ImageLoaded {
                    natural_width,
                    natural_height,
                },
            ) => {
                image.natural_width = natural_width;
                image.natural_height = natural_height;
                true
            }
            (Element::Code(code), ResourceOutcome::CodeHighlighted(ok)) => {
                code.highlighted = ok;
                true
            }
            (element, outcome) => {
                debug!(
                    "outcome {outcome:?} does not apply to a {:?} element",
                    element.kind()
                );
                false
            }
        }
    }

    /// Forget all outstanding loads, e.g. when a new document replaces
    /// the workspace.
    pub fn reset(&mut self) {
        self.generations.clear();
    }
}
