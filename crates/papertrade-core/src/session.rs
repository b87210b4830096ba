use crate::{Ledger, SaveFile, Snapshot, StoreError};

/// A ledger loaded from a save file, written back on [`Session::save`].
///
/// The save file is only opened while loading and saving.
#[derive(Debug)]
pub struct Session {
    save_file: SaveFile,
    ledger: Ledger,
    saved: Snapshot,
}

impl Session {
    pub fn open(save_file: SaveFile) -> Result<Self, StoreError> {
        let saved = save_file.load()?;
        Ok(Self {
            ledger: Ledger::from_snapshot(saved.clone()),
            save_file,
            saved,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn save_file(&self) -> &SaveFile {
        &self.save_file
    }

    /// Whether the ledger differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.ledger.snapshot() != self.saved
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let snapshot = self.ledger.snapshot();
        self.save_file.save(&snapshot)?;
        self.saved = snapshot;
        Ok(())
    }

    /// Save only if something changed. Returns whether a write happened.
    pub fn save_if_dirty(&mut self) -> Result<bool, StoreError> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
