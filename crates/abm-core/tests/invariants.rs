//! Property tests for the engine invariants
//!
//! Placement consistency, conservation of agents and wealth, the Gini range,
//! and torus wrapping, checked over random seeds and sizes.

use abm_core::components::Grid;
use abm_core::setup::health_by_agent;
use abm_core::{gini_coefficient, EpidemicConfig, ModelConfig, SimConfig, Simulation, WealthConfig};
use abm_data::Coord;
use proptest::prelude::*;

fn config(seed: u64, width: u32, height: u32, model: ModelConfig) -> SimConfig {
    let mut config = SimConfig::epidemic();
    config.simulation.seed = seed;
    config.grid.width = width;
    config.grid.height = height;
    config.model = model;
    config
}

prop_compose! {
    fn arb_epidemic()(
        density in 0.0f64..=1.0,
        initial_infected in 0usize..10,
        infection_rate in 0.0f64..=1.0,
        recovery_time in 1u32..8,
    ) -> EpidemicConfig {
        EpidemicConfig {
            density,
            population: None,
            initial_infected,
            infection_rate,
            recovery_time,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_epidemic_conserves_population(
        seed in any::<u64>(),
        width in 1u32..10,
        height in 1u32..10,
        epidemic in arb_epidemic(),
    ) {
        let population = epidemic.population_for(width, height) as f64;
        let mut sim = Simulation::from_config(&config(seed, width, height, ModelConfig::Epidemic(epidemic))).unwrap();

        for _ in 0..15 {
            let snap = sim.step().unwrap().clone();
            let s = snap.get("Susceptible").unwrap();
            let i = snap.get("Infected").unwrap();
            let r = snap.get("Recovered").unwrap();
            prop_assert_eq!(s + i + r, population);
            prop_assert!(sim.check_consistency().is_ok());
        }

        // recovered agents never relapse
        let recovered = sim.history().column("Recovered").unwrap();
        prop_assert!(recovered.windows(2).all(|w| w[0] <= w[1]));
        let health = health_by_agent(&mut sim);
        prop_assert!(health.iter().all(|h| h.infected_for < 8));
    }

    #[test]
    fn prop_wealth_is_conserved(
        seed in any::<u64>(),
        width in 1u32..8,
        height in 1u32..8,
        agents in 0usize..60,
        initial_wealth in 0u64..50,
    ) {
        let model = ModelConfig::Wealth(WealthConfig { agents, initial_wealth });
        let mut sim = Simulation::from_config(&config(seed, width, height, model)).unwrap();
        let total = (agents as u64 * initial_wealth) as f64;

        for _ in 0..20 {
            sim.step().unwrap();
            prop_assert!(sim.check_consistency().is_ok());
        }
        for snap in sim.history().iter() {
            prop_assert_eq!(snap.get("Total"), Some(total));
            let gini = snap.get("Gini").unwrap();
            prop_assert!((0.0..1.0).contains(&gini), "gini {} out of range", gini);
        }
    }

    #[test]
    fn prop_gini_bounds(values in prop::collection::vec(0u64..1000, 0..80)) {
        let n = values.len() as f64;
        let gini = gini_coefficient(values.iter().map(|&v| v as f64));
        prop_assert!(gini >= 0.0);
        if n > 0.0 {
            prop_assert!(gini <= (n - 1.0) / n + 1e-9);
        }
    }

    #[test]
    fn prop_equal_shares_have_zero_gini(value in 0u64..1000, n in 1usize..100) {
        let gini = gini_coefficient(std::iter::repeat(value as f64).take(n));
        prop_assert!(gini.abs() < 1e-9);
    }

    #[test]
    fn prop_torus_wraps_every_coordinate(
        width in 1u32..20,
        height in 1u32..20,
        x in -1000i32..1000,
        y in -1000i32..1000,
    ) {
        let grid = Grid::torus(width, height).unwrap();
        let wrapped = grid.normalize(Coord::new(x, y)).unwrap();
        prop_assert_eq!(wrapped, Coord::new(x.rem_euclid(width as i32), y.rem_euclid(height as i32)));
        // shifting by whole laps lands on the same cell
        let lapped = grid.normalize(Coord::new(x + width as i32, y - height as i32)).unwrap();
        prop_assert_eq!(lapped, wrapped);
    }
}
