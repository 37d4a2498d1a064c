//! University → Institute → Program → Branch → Year selector.
//!
//! Selecting a value clears every deeper level and yields a `PendingLoad` for the next one.
//! Each level carries a generation counter that is bumped whenever the level is cleared, so
//! a load that finishes after its parent changed again is recognised and dropped.

use crate::api::{RequestClient, ResourceClient};
use crate::errors::ClientError;
use crate::models::{Branch, Institute, Program, Record, RecordId, University, Year};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    University,
    Institute,
    Program,
    Branch,
    Year,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::University,
        Level::Institute,
        Level::Program,
        Level::Branch,
        Level::Year,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn parent(self) -> Option<Level> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn child(self) -> Option<Level> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Query parameter naming the parent id when this level's options are fetched.
    pub fn filter_param(self) -> Option<&'static str> {
        match self {
            Level::University => None,
            Level::Institute => Some("university_id"),
            Level::Program => Some("institute_id"),
            Level::Branch => Some("program_id"),
            Level::Year => Some("branch_id"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::University => "University",
            Level::Institute => "Institute",
            Level::Program => "Program",
            Level::Branch => "Branch",
            Level::Year => "Year",
        }
    }
}

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: RecordId,
    pub label: String,
}

impl SelectOption {
    pub fn from_record<R: Record>(record: &R) -> Self {
        Self {
            id: record.id(),
            label: record.label(),
        }
    }
}

/// An option load that was started for `level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub level: Level,
    pub parent_id: Option<RecordId>,
    generation: u64,
}

#[derive(Debug, Default)]
struct LevelState {
    options: Vec<SelectOption>,
    selected: Option<RecordId>,
    generation: u64,
}

impl LevelState {
    fn reset(&mut self) {
        self.options.clear();
        self.selected = None;
        self.generation += 1;
    }
}

#[derive(Debug, Default)]
pub struct CascadingSelector {
    levels: [LevelState; 5],
}

impl CascadingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, level: Level) -> &LevelState {
        &self.levels[level.index()]
    }

    pub fn options(&self, level: Level) -> &[SelectOption] {
        &self.state(level).options
    }

    pub fn selected(&self, level: Level) -> Option<RecordId> {
        self.state(level).selected
    }

    pub fn selected_option(&self, level: Level) -> Option<&SelectOption> {
        let id = self.selected(level)?;
        self.options(level).iter().find(|o| o.id == id)
    }

    /// A level can be used once its parent has a selection.
    pub fn is_enabled(&self, level: Level) -> bool {
        level
            .parent()
            .map_or(true, |parent| self.selected(parent).is_some())
    }

    /// Start loading the top level, discarding everything below.
    pub fn reload_root(&mut self) -> PendingLoad {
        for state in &mut self.levels {
            state.reset();
        }
        PendingLoad {
            level: Level::University,
            parent_id: None,
            generation: self.state(Level::University).generation,
        }
    }

    /// Select `id` at `level`, clearing all deeper levels.
    ///
    /// Returns the load to run for the next level, or `None` at the last level.
    pub fn select(&mut self, level: Level, id: RecordId) -> Result<Option<PendingLoad>, ClientError> {
        if !self.is_enabled(level) {
            let parent = level.parent().map_or("parent", Level::label);
            return Err(ClientError::InvalidSelection(format!(
                "Select a {} before choosing a {}",
                parent,
                level.label()
            )));
        }
        if !self.options(level).iter().any(|o| o.id == id) {
            return Err(ClientError::InvalidSelection(format!(
                "{} {} is not one of the offered options",
                level.label(),
                id
            )));
        }

        self.levels[level.index()].selected = Some(id);
        for state in &mut self.levels[level.index() + 1..] {
            state.reset();
        }

        Ok(level.child().map(|child| PendingLoad {
            level: child,
            parent_id: Some(id),
            generation: self.state(child).generation,
        }))
    }

    /// Install loaded options. Returns `false` if the load went stale in the meantime.
    pub fn apply(&mut self, load: &PendingLoad, options: Vec<SelectOption>) -> bool {
        let state = &mut self.levels[load.level.index()];
        if state.generation != load.generation {
            tracing::debug!(
                "Discarding stale {} options (generation {} != {})",
                load.level.label(),
                load.generation,
                state.generation
            );
            return false;
        }
        state.options = options;
        true
    }

    /// Fetch and install the University options.
    pub async fn load_universities(&mut self, client: &RequestClient) -> Result<(), ClientError> {
        let load = self.reload_root();
        let options = fetch_options(client, &load).await?;
        self.apply(&load, options);
        Ok(())
    }

    /// Select `id` at `level` and fetch the next level's options.
    pub async fn choose(
        &mut self,
        client: &RequestClient,
        level: Level,
        id: RecordId,
    ) -> Result<(), ClientError> {
        if let Some(load) = self.select(level, id)? {
            let options = fetch_options(client, &load).await?;
            self.apply(&load, options);
        }
        Ok(())
    }
}

/// Fetch the options a pending load asks for.
pub async fn fetch_options(
    client: &RequestClient,
    load: &PendingLoad,
) -> Result<Vec<SelectOption>, ClientError> {
    let filter: Vec<(&str, String)> = match (load.level.filter_param(), load.parent_id) {
        (Some(param), Some(parent)) => vec![(param, parent.to_string())],
        _ => Vec::new(),
    };

    match load.level {
        Level::University => options_of::<University>(client, &filter).await,
        Level::Institute => options_of::<Institute>(client, &filter).await,
        Level::Program => options_of::<Program>(client, &filter).await,
        Level::Branch => options_of::<Branch>(client, &filter).await,
        Level::Year => options_of::<Year>(client, &filter).await,
    }
}

async fn options_of<R: Record>(
    client: &RequestClient,
    filter: &[(&str, String)],
) -> Result<Vec<SelectOption>, ClientError> {
    let records = ResourceClient::<R>::new(client.clone())
        .list_where(filter)
        .await?;
    Ok(records.iter().map(SelectOption::from_record).collect())
}
