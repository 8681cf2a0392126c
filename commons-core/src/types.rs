use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct AgentId;
}

// ============================================================================
// Energy strategies - How an agent gathers food
// ============================================================================

/// The energy source an agent relies on. The world tick never branches on
/// this; it exists so presentation and fuel policies can tell agents apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum EnergyStrategy {
    Solar,
    FossilFuel,
}

impl EnergyStrategy {
    pub fn is_fossil(self) -> bool {
        matches!(self, EnergyStrategy::FossilFuel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fossil() {
        assert!(EnergyStrategy::FossilFuel.is_fossil());
        assert!(!EnergyStrategy::Solar.is_fossil());
    }
}
