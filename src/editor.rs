//! # Edit Session
//!
//! One recipe, one mutable working copy. The session owns the last-saved
//! snapshot, the working tree, the dirty flag, the selected instruction line
//! and at most one open inline input. The working tree is the only source of
//! truth; the view is re-rendered from it after every change.
//!
//! ## Protocol
//!
//! - Click a span: [`EditSession::begin_edit`] opens an inline input seeded
//!   with the raw value (quantities as plain numbers, not glyphs)
//! - Type: [`EditSession::set_input`]
//! - Enter or blur: [`EditSession::commit`] writes the value into the tree
//!   and marks the session dirty if it changed
//! - Escape: [`EditSession::cancel`] drops every unsaved change
//! - Mod+Up / Mod+Down on a selected step: [`EditSession::move_selected_step`]
//!   swaps it with its neighbour and renumbers all steps 1..N
//! - Save: [`EditSession::save`] persists, re-reads, then clears dirty

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{RecipeError, Result};
use crate::recipe_model::{non_empty, Quantity, Recipe, Step};
use crate::renderer::{render_recipe, RecipeView};
use crate::store::RecipeStore;

/// Editable field of an ingredient line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientField {
    Quantity,
    Unit,
    Name,
    PrepNotes,
}

/// An editable span, addressed by tree indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditTarget {
    SectionName {
        section: usize,
    },
    StepText {
        section: usize,
        step: usize,
    },
    Ingredient {
        section: usize,
        ingredient: usize,
        field: IngredientField,
    },
}

/// Position of a step inside the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRef {
    pub section: usize,
    pub step: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Keyboard commands understood by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Enter,
    Escape,
    /// Modifier + arrow on the selected instruction line
    MoveStep(Direction),
}

/// The currently open inline input
#[derive(Debug, Clone, PartialEq)]
pub struct InlineInput {
    pub target: EditTarget,
    pub value: String,
}

/// Editing state for one recipe
#[derive(Debug, Clone)]
pub struct EditSession {
    snapshot: Recipe,
    working: Recipe,
    dirty: bool,
    selected: Option<StepRef>,
    input: Option<InlineInput>,
}

impl EditSession {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            snapshot: recipe.clone(),
            working: recipe,
            dirty: false,
            selected: None,
            input: None,
        }
    }

    /// The working tree
    pub fn recipe(&self) -> &Recipe {
        &self.working
    }

    /// The last-saved tree
    pub fn snapshot(&self) -> &Recipe {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected_step(&self) -> Option<StepRef> {
        self.selected
    }

    pub fn open_input(&self) -> Option<&InlineInput> {
        self.input.as_ref()
    }

    /// Project the working tree
    pub fn render(&self) -> RecipeView {
        render_recipe(&self.working)
    }

    /// Raw value of an editable span
    pub fn read_value(&self, target: EditTarget) -> Result<String> {
        match target {
            EditTarget::SectionName { section } => Ok(self
                .working
                .sections
                .get(section)
                .ok_or_else(|| invalid(format!("no section {section}")))?
                .name
                .clone()
                .unwrap_or_default()),
            EditTarget::StepText { section, step } => {
                Ok(self.step(section, step)?.instructions.clone())
            }
            EditTarget::Ingredient {
                section,
                ingredient,
                field,
            } => {
                let line = self
                    .working
                    .sections
                    .get(section)
                    .and_then(|s| s.ingredients.get(ingredient))
                    .ok_or_else(|| invalid(format!("no ingredient {section}/{ingredient}")))?;
                Ok(match field {
                    IngredientField::Quantity => line.quantity.raw(),
                    IngredientField::Unit => line.unit.clone(),
                    IngredientField::Name => line.name.clone(),
                    IngredientField::PrepNotes => line.prep_notes.clone().unwrap_or_default(),
                })
            }
        }
    }

    /// Open an inline input on `target`. An input already open elsewhere is
    /// committed first, as a blur would.
    pub fn begin_edit(&mut self, target: EditTarget) -> Result<&InlineInput> {
        let value = self.read_value(target)?;
        if self.input.is_some() {
            self.commit()?;
        }
        debug!(?target, "inline edit opened");
        Ok(&*self.input.insert(InlineInput { target, value }))
    }

    /// Replace the text of the open input
    pub fn set_input(&mut self, value: &str) -> Result<()> {
        let input = self.input.as_mut().ok_or(RecipeError::NoActiveEdit)?;
        input.value = value.to_string();
        Ok(())
    }

    /// Close the open input and write its value into the working tree.
    /// Returns whether the tree changed.
    pub fn commit(&mut self) -> Result<bool> {
        let input = self.input.take().ok_or(RecipeError::NoActiveEdit)?;
        self.apply_edit(input.target, &input.value)
    }

    /// Write `value` into the span at `target`, marking the session dirty if
    /// it changed anything
    pub fn apply_edit(&mut self, target: EditTarget, value: &str) -> Result<bool> {
        let before = self.read_value(target)?;
        let value = value.trim();

        match target {
            EditTarget::SectionName { section } => {
                self.working.sections[section].name = non_empty(Some(value.to_string()));
            }
            EditTarget::StepText { section, step } => {
                self.working.sections[section].steps[step].instructions = value.to_string();
            }
            EditTarget::Ingredient {
                section,
                ingredient,
                field,
            } => {
                let line = &mut self.working.sections[section].ingredients[ingredient];
                match field {
                    IngredientField::Quantity => line.quantity = Quantity::parse(value),
                    IngredientField::Unit => line.unit = value.to_string(),
                    IngredientField::Name => line.name = value.to_string(),
                    IngredientField::PrepNotes => {
                        line.prep_notes = non_empty(Some(value.to_string()))
                    }
                }
            }
        }

        let changed = self.read_value(target)? != before;
        if changed {
            self.dirty = true;
            debug!(?target, "edit committed");
        }
        Ok(changed)
    }

    /// Mark an instruction line as selected
    pub fn select_step(&mut self, section: usize, step: usize) -> Result<()> {
        self.step(section, step)?;
        self.selected = Some(StepRef { section, step });
        Ok(())
    }

    /// Swap the selected step with its neighbour in the same section and
    /// renumber. Returns `false` when there is no selection or the step is
    /// already at the section boundary.
    pub fn move_selected_step(&mut self, direction: Direction) -> Result<bool> {
        if self.input.is_some() {
            self.commit()?;
        }
        let Some(StepRef { section, step }) = self.selected else {
            return Ok(false);
        };
        let steps = &mut self.working.sections[section].steps;
        let target = match direction {
            Direction::Up if step > 0 => step - 1,
            Direction::Down if step + 1 < steps.len() => step + 1,
            _ => return Ok(false),
        };

        steps.swap(step, target);
        self.selected = Some(StepRef {
            section,
            step: target,
        });
        self.working.renumber_steps();
        self.dirty = true;
        debug!(section, from = step, to = target, "step moved");
        Ok(true)
    }

    /// Append a new, not yet persisted step to a section. Returns its index.
    pub fn add_step(&mut self, section: usize, text: &str) -> Result<usize> {
        let target = self
            .working
            .sections
            .get_mut(section)
            .ok_or_else(|| invalid(format!("no section {section}")))?;
        target.steps.push(Step {
            id: None,
            section_id: target.id,
            step_number: 0,
            instructions: text.trim().to_string(),
        });
        let index = target.steps.len() - 1;
        self.working.renumber_steps();
        self.dirty = true;
        Ok(index)
    }

    /// Renumber all steps 1..N in display order. Dirties the session only
    /// when some stored number was out of sequence.
    pub fn renumber_steps(&mut self) -> bool {
        let before: Vec<i64> = self.working.all_steps().map(|s| s.step_number).collect();
        self.working.renumber_steps();
        let changed = self
            .working
            .all_steps()
            .map(|s| s.step_number)
            .ne(before.into_iter());
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Dispatch a keyboard command
    pub fn handle_key(&mut self, key: KeyCommand) -> Result<()> {
        match key {
            KeyCommand::Enter => {
                if self.input.is_some() {
                    self.commit()?;
                }
            }
            KeyCommand::Escape => self.cancel(),
            KeyCommand::MoveStep(direction) => {
                self.move_selected_step(direction)?;
            }
        }
        Ok(())
    }

    /// Discard every unsaved change and all transient edit state
    pub fn cancel(&mut self) {
        if self.dirty {
            info!(recipe_id = self.working.id, "Discarding unsaved edits");
        }
        self.working = self.snapshot.clone();
        self.dirty = false;
        self.selected = None;
        self.input = None;
    }

    /// Persist the working tree and adopt the re-read recipe as the new
    /// snapshot. A clean session saves nothing and returns `false`.
    ///
    /// On failure the working tree and dirty flag are left as they were so
    /// the user can retry or cancel.
    pub async fn save(&mut self, store: &RecipeStore) -> Result<bool> {
        if self.input.is_some() {
            self.commit()?;
        }
        if !self.dirty {
            return Ok(false);
        }

        let fresh = match store.save_recipe(&self.working).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(recipe_id = self.working.id, error = %e, "Save failed; edits kept");
                return Err(e);
            }
        };

        self.snapshot = fresh.clone();
        self.working = fresh;
        self.dirty = false;
        self.selected = None;
        info!(recipe_id = self.working.id, "Recipe saved");
        Ok(true)
    }

    fn step(&self, section: usize, step: usize) -> Result<&Step> {
        self.working
            .sections
            .get(section)
            .and_then(|s| s.steps.get(step))
            .ok_or_else(|| invalid(format!("no step {section}/{step}")))
    }
}

fn invalid(msg: String) -> RecipeError {
    RecipeError::InvalidEdit(msg)
}
