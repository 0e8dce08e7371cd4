//! Undo/Redo über Command-Werte.
//!
//! Ein Command kennt seine Anwendung (`apply`) und kann im Zustand *nach*
//! seiner Anwendung sein Inverses bauen (`inverse`). Undo ersetzt den obersten
//! Eintrag durch sein Inverses und wendet dieses an; Redo ist symmetrisch.

use anyhow::Result;

/// Ein rückgängig machbarer Schritt auf einem Ziel `T`.
pub trait Command<T>: Sized {
    /// Führt den Schritt aus (inklusive Seiteneffekten).
    fn apply(&self, target: &mut T) -> Result<()>;

    /// Baut den Gegen-Schritt; wird im Zustand nach `apply` aufgerufen.
    fn inverse(&self, target: &T) -> Result<Self>;
}

/// Command-Stack mit begrenzter Tiefe.
#[derive(Debug)]
pub struct UndoStack<C> {
    undo_stack: Vec<C>,
    redo_stack: Vec<C>,
    max_depth: usize,
}

impl<C> Default for UndoStack<C> {
    fn default() -> Self {
        Self::new_with_capacity(crate::shared::HISTORY_DEPTH)
    }
}

impl<C> UndoStack<C> {
    /// Erstellt einen neuen Stack mit maximaler Tiefe.
    pub fn new_with_capacity(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Zeichnet einen Command auf, dessen Effekt bereits eingetreten ist.
    /// Verwirft den Redo-Stack.
    pub fn push(&mut self, command: C) {
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    /// Wendet den Command an und zeichnet ihn danach auf.
    pub fn apply_and_push<T>(&mut self, target: &mut T, command: C) -> Result<()>
    where
        C: Command<T>,
    {
        command.apply(target)?;
        self.push(command);
        Ok(())
    }

    /// Macht den letzten Schritt rückgängig. `Ok(false)` wenn nichts zu tun ist.
    pub fn undo<T>(&mut self, target: &mut T) -> Result<bool>
    where
        C: Command<T>,
    {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        let inverse = match command.inverse(target) {
            Ok(inverse) => inverse,
            Err(e) => {
                self.undo_stack.push(command);
                return Err(e);
            }
        };
        inverse.apply(target)?;
        if self.redo_stack.len() >= self.max_depth {
            self.redo_stack.remove(0);
        }
        self.redo_stack.push(inverse);
        Ok(true)
    }

    /// Stellt den zuletzt rückgängig gemachten Schritt wieder her.
    pub fn redo<T>(&mut self, target: &mut T) -> Result<bool>
    where
        C: Command<T>,
    {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        let forward = match command.inverse(target) {
            Ok(forward) => forward,
            Err(e) => {
                self.redo_stack.push(command);
                return Err(e);
            }
        };
        forward.apply(target)?;
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(forward);
        Ok(true)
    }

    /// Prüft ob Undo möglich ist.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Prüft ob Redo möglich ist.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Anzahl der Undo-Schritte.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    /// `true` wenn keine Undo-Schritte vorhanden sind.
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}
