use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use smallvec::SmallVec;
use specs::prelude::*;

use super::{
    components::{Intent, Velocity, Walker},
    resources::TickDelta,
};

/// Turns a walker's movement budget for this tick into random single steps.
#[derive(Default)]
pub struct WanderSystem;

impl<'a> System<'a> for WanderSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Walker>,
        WriteStorage<'a, Intent>,
        ReadExpect<'a, TickDelta>,
        WriteExpect<'a, RandomNumberGenerator>,
    );

    fn run(&mut self, (entities, walkers, mut intents, delta, mut rng): Self::SystemData) {
        for (entity, walker) in (&entities, &walkers).join() {
            let steps = plan_wander(walker.speed, delta.0, &mut rng);
            if steps.is_empty() {
                continue;
            }
            let _ = intents.insert(entity, Intent::Walk(steps));
        }
    }
}

/// Integrates velocity over the tick.
#[derive(Default)]
pub struct FlightSystem;

impl<'a> System<'a> for FlightSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Velocity>,
        WriteStorage<'a, Intent>,
        ReadExpect<'a, TickDelta>,
    );

    fn run(&mut self, (entities, velocities, mut intents, delta): Self::SystemData) {
        for (entity, velocity) in (&entities, &velocities).join() {
            let _ = intents.insert(
                entity,
                Intent::Drift {
                    dx: velocity.dx * delta.0,
                    dy: velocity.dy * delta.0,
                },
            );
        }
    }
}

/// One Bernoulli trial per whole or partial unit of `speed * elapsed`, each
/// succeeding with probability `min(budget, 1)`.
pub fn plan_wander(
    speed: f32,
    elapsed: f32,
    rng: &mut RandomNumberGenerator,
) -> SmallVec<[Point; 4]> {
    let mut steps = SmallVec::new();
    let mut budget = speed * elapsed;
    while budget > 0.0 {
        let chance = budget.min(1.0);
        if rng.rand::<f32>() < chance {
            steps.push(Point::new(rng.range(-1, 2), rng.range(-1, 2)));
        }
        budget -= 1.0;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_budget_gives_one_extra_trial() {
        for seed in 0..64 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let steps = plan_wander(2.5, 1.0, &mut rng);
            assert!(steps.len() >= 2, "two certain trials, seed {seed}");
            assert!(steps.len() <= 3, "at most three trials, seed {seed}");
        }
    }

    #[test]
    fn whole_budget_is_always_spent() {
        let mut rng = RandomNumberGenerator::seeded(11);
        assert_eq!(plan_wander(3.0, 1.0, &mut rng).len(), 3);
    }

    #[test]
    fn zero_speed_never_moves() {
        let mut rng = RandomNumberGenerator::seeded(3);
        assert!(plan_wander(0.0, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn steps_stay_within_one_tile() {
        let mut rng = RandomNumberGenerator::seeded(5);
        for _ in 0..100 {
            for step in plan_wander(4.0, 1.0, &mut rng) {
                assert!((-1..=1).contains(&step.x));
                assert!((-1..=1).contains(&step.y));
            }
        }
    }

    #[test]
    fn slow_walkers_sometimes_rest() {
        let mut rng = RandomNumberGenerator::seeded(9);
        let moved = (0..1000)
            .filter(|_| !plan_wander(1.5, 0.05, &mut rng).is_empty())
            .count();
        assert!(moved > 20 && moved < 150, "moved {moved} of 1000 ticks");
    }
}
