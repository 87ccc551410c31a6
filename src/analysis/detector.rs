use super::{References, SuppressionChain, SymbolDefinition};
use crate::config::Config;
use tracing::debug;

/// Subtracts referenced identities from declared ones and filters the
/// remainder through the suppression chain
pub struct UnusedSymbolDetector<'a> {
    chain: SuppressionChain<'a>,
}

impl<'a> UnusedSymbolDetector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            chain: SuppressionChain::new(config),
        }
    }

    /// Declared symbols with no reference, before any suppression
    pub fn candidates<'d>(
        &self,
        declared: &'d [SymbolDefinition],
        referenced: &References,
    ) -> Vec<&'d SymbolDefinition> {
        declared
            .iter()
            .filter(|definition| !referenced.contains(definition.identity()))
            .collect()
    }

    /// Unreferenced symbols that no rule keeps, ordered by file then line
    pub fn detect(
        &self,
        declared: Vec<SymbolDefinition>,
        referenced: &References,
    ) -> Vec<SymbolDefinition> {
        let mut unused: Vec<SymbolDefinition> = self
            .candidates(&declared, referenced)
            .into_iter()
            .filter(|definition| match self.chain.suppression(&definition.symbol) {
                Some(reason) => {
                    debug!("Keeping {} ({})", definition.fully_qualified_name, reason);
                    false
                }
                None => true,
            })
            .cloned()
            .collect();

        unused.sort_by(|a, b| (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number)));
        unused
    }
}
