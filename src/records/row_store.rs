use crate::fetch::Observation;

/// Latest observation per symbol, most recently updated first.
#[derive(Debug, Default, Clone)]
pub struct RowStore {
    rows: Vec<Observation>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any row for the same symbol and move it to the front.
    pub fn upsert(&mut self, observation: Observation) {
        self.rows.retain(|row| row.symbol != observation.symbol);
        self.rows.insert(0, observation);
    }

    pub fn snapshot(&self) -> &[Observation] {
        &self.rows
    }

    pub fn get(&self, symbol: &str) -> Option<&Observation> {
        self.rows.iter().find(|row| row.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
