/// All tunable parameters of the feasibility search, with the defaults the
/// strategies were calibrated on.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub enumeration: EnumerationConfig,
    pub tolerances: ToleranceConfig,
    pub price_sweep: PriceSweepConfig,
    pub capacity_search: CapacitySearchConfig,
    pub capacity_inflation: CapacityInflationConfig,
}

#[derive(Debug, Clone)]
pub struct EnumerationConfig {
    /// Cutoff on the number of hops of a candidate route.
    pub max_hops: usize,
    pub max_routes_per_demand: usize,
}

#[derive(Debug, Clone)]
pub struct ToleranceConfig {
    /// Route flows below this count as unused.
    pub flow: f64,
    /// Slack around the equilibrium cost.
    pub cost: f64,
    /// Lower bound for prices the solver is free to choose.
    pub price_min: f64,
}

#[derive(Debug, Clone)]
pub struct PriceSweepConfig {
    pub max: f64,
    pub min: f64,
    pub delta: f64,
}

#[derive(Debug, Clone)]
pub struct CapacitySearchConfig {
    pub min: f64,
    pub max: f64,
    pub iterations: u32,
}

#[derive(Debug, Clone)]
pub struct CapacityInflationConfig {
    pub delta: f64,
    pub max_rounds: u32,
}

impl Default for EnumerationConfig {
    fn default() -> EnumerationConfig {
        EnumerationConfig {
            max_hops: 4,
            max_routes_per_demand: 6,
        }
    }
}

impl Default for ToleranceConfig {
    fn default() -> ToleranceConfig {
        ToleranceConfig {
            flow: 1.0,
            cost: 5.0,
            price_min: 5.0,
        }
    }
}

impl Default for PriceSweepConfig {
    fn default() -> PriceSweepConfig {
        PriceSweepConfig {
            max: 120.0,
            min: 5.0,
            delta: 5.0,
        }
    }
}

impl Default for CapacitySearchConfig {
    fn default() -> CapacitySearchConfig {
        CapacitySearchConfig {
            min: 500.0,
            max: 5000.0,
            iterations: 6,
        }
    }
}

impl Default for CapacityInflationConfig {
    fn default() -> CapacityInflationConfig {
        CapacityInflationConfig {
            delta: 50.0,
            max_rounds: 10,
        }
    }
}
