//! Stateful BACnet event generation.
//!
//! One [`BacnetGenerator`] owns the live-object table for a run and produces
//! one event per call: mostly value updates against points it has already
//! defined, a trickle of new definitions and the occasional decommissioning
//! once the table is comfortably populated.

use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};
use rand_distr::StandardNormal;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::bacnet::{ObjectKey, ObjectType, PointValue, ValueKind};
use crate::message::{
    DELETE_REASON, Definition, Delete, Message, MessageKind, Quality, StatusFlags, Update,
};
use crate::{Error, weighted};

/// Relative frequency of each message kind.
const MESSAGE_KINDS: [(MessageKind, f64); 3] = [
    (MessageKind::ValueUpdate, 0.90),
    (MessageKind::ObjectDefinition, 0.08),
    (MessageKind::ObjectDelete, 0.02),
];

/// Relative frequency of each object type among new definitions.
const OBJECT_TYPES: [(ObjectType, f64); 5] = [
    (ObjectType::AnalogInput, 0.40),
    (ObjectType::AnalogValue, 0.30),
    (ObjectType::BinaryInput, 0.15),
    (ObjectType::BinaryValue, 0.10),
    (ObjectType::MultiStateValue, 0.05),
];

/// Deletes are only issued while more than this many objects are live, so
/// the table never drains to nothing.
const DELETE_FLOOR: usize = 20;

/// Change-of-value thresholds handed out to analog points.
const COV_INCREMENTS: [f64; 3] = [0.1, 0.5, 1.0];

/// Chance that an updated binary point flips state.
const FLIP_PROBABILITY: f64 = 0.1;

/// Chance that an update reports an alarm condition.
const IN_ALARM_PROBABILITY: f64 = 0.02;

/// Chance that an update reports an internal fault.
const FAULT_PROBABILITY: f64 = 0.01;

/// Generates a stream of plausible BACnet events.
///
/// The generator is deliberately free of IO and RNG ownership: every call
/// takes the caller's `Rng`, so a seeded run reproduces the same event
/// sequence apart from envelope timestamps.
#[derive(Debug, Default)]
pub struct BacnetGenerator {
    /// Live points, keyed by type and instance, holding their last value.
    objects: FxHashMap<ObjectKey, PointValue>,
    /// The instance number the next definition of each type will take.
    next_instance: FxHashMap<ObjectType, u32>,
}

impl BacnetGenerator {
    /// Create a generator with an empty live-object table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points currently live.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Produce the next event.
    ///
    /// A message kind and an object type are drawn from the fixed
    /// distributions, then the kind dispatches: definitions always go
    /// through, updates need a live point to update and deletes additionally
    /// need the table above its floor. Unsatisfiable draws degrade toward
    /// definition so the first event of a run is always one.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be built, which would
    /// indicate a broken clock rather than bad input.
    pub fn generate<R>(&mut self, rng: &mut R) -> Result<Message, Error>
    where
        R: Rng + ?Sized,
    {
        let kind = *weighted::choose(rng, &MESSAGE_KINDS);
        let object_type = *weighted::choose(rng, &OBJECT_TYPES);

        match kind {
            MessageKind::ObjectDefinition => self.define(rng, object_type),
            MessageKind::ValueUpdate => match self.random_key(rng) {
                Some(key) => self.update_existing(rng, key),
                None => {
                    trace!("no live objects to update, defining {object_type} instead");
                    self.define(rng, object_type)
                }
            },
            MessageKind::ObjectDelete => {
                if self.objects.len() > DELETE_FLOOR
                    && let Some(key) = self.random_key(rng)
                {
                    return self.delete(key);
                }
                match self.random_key(rng) {
                    Some(key) => {
                        trace!("table at or below delete floor, updating instead");
                        self.update_existing(rng, key)
                    }
                    None => {
                        trace!("no live objects to delete, defining {object_type} instead");
                        self.define(rng, object_type)
                    }
                }
            }
        }
    }

    /// Uniformly pick a live key, or `None` when the table is empty.
    fn random_key<R>(&self, rng: &mut R) -> Option<ObjectKey>
    where
        R: Rng + ?Sized,
    {
        self.objects.keys().copied().choose(rng)
    }

    /// Allocate the next instance number for `object_type`, starting at 1.
    fn allocate_instance(&mut self, object_type: ObjectType) -> u32 {
        let counter = self.next_instance.entry(object_type).or_insert(1);
        let instance = *counter;
        *counter += 1;
        instance
    }

    fn define<R>(&mut self, rng: &mut R, object_type: ObjectType) -> Result<Message, Error>
    where
        R: Rng + ?Sized,
    {
        let instance = self.allocate_instance(object_type);
        let (units, units_text) = *object_type
            .units()
            .choose(rng)
            .expect("units tables are non-empty");

        let (initial_value, cov_increment) = match object_type.value_kind() {
            ValueKind::Real => (
                PointValue::Real(rng.random_range(0.0..100.0)),
                COV_INCREMENTS.choose(rng).copied(),
            ),
            ValueKind::Boolean => (PointValue::Boolean(rng.random_bool(0.5)), None),
            ValueKind::Unsigned => (PointValue::Unsigned(rng.random_range(1..=5)), None),
        };

        self.objects.insert((object_type, instance), initial_value);

        Message::definition(Definition {
            object_type,
            object_instance: instance,
            object_name: object_type.object_name(instance),
            description: format!("Load test object {instance}"),
            present_value_type: object_type.value_kind(),
            units,
            units_text: units_text.to_string(),
            initial_value,
            cov_increment,
        })
    }

    fn update_existing<R>(&mut self, rng: &mut R, key: ObjectKey) -> Result<Message, Error>
    where
        R: Rng + ?Sized,
    {
        let value = self
            .objects
            .get_mut(&key)
            .expect("key was drawn from the live table");

        let new_value = match *value {
            PointValue::Real(current) => {
                // Gaussian random walk, held inside the instrument's range.
                let delta: f64 = rng.sample(StandardNormal);
                PointValue::Real((current + delta).clamp(0.0, 100.0))
            }
            PointValue::Boolean(current) => {
                if rng.random_bool(FLIP_PROBABILITY) {
                    PointValue::Boolean(!current)
                } else {
                    PointValue::Boolean(current)
                }
            }
            PointValue::Unsigned(_) => PointValue::Unsigned(rng.random_range(1..=5)),
        };
        *value = new_value;

        let in_alarm = rng.random_bool(IN_ALARM_PROBABILITY);
        let fault = rng.random_bool(FAULT_PROBABILITY);
        let quality = if in_alarm || fault {
            Quality::Uncertain
        } else {
            Quality::Good
        };

        Message::update(Update {
            object_type: key.0,
            object_instance: key.1,
            present_value: new_value,
            quality,
            status_flags: StatusFlags::new(in_alarm, fault),
        })
    }

    fn delete(&mut self, key: ObjectKey) -> Result<Message, Error> {
        self.objects.remove(&key);

        Message::delete(Delete {
            object_type: key.0,
            object_instance: key.1,
            reason: DELETE_REASON.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::{BacnetGenerator, DELETE_FLOOR, MESSAGE_KINDS, OBJECT_TYPES};
    use crate::bacnet::{ObjectKey, ObjectType, PointValue, ValueKind};
    use crate::message::{MessageKind, Payload, Quality};

    #[test]
    fn kind_weights_sum_to_one() {
        let total: f64 = MESSAGE_KINDS.iter().map(|(_, weight)| weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "kind weights sum to {total}");
    }

    #[test]
    fn object_type_weights_sum_to_one() {
        let total: f64 = OBJECT_TYPES.iter().map(|(_, weight)| weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "type weights sum to {total}");
    }

    proptest! {
        // With an empty table both the update and delete draws must degrade
        // to a definition, so the first event of any run defines instance 1.
        #[test]
        fn first_message_is_a_definition(seed: u64) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut generator = BacnetGenerator::new();
            let message = generator.generate(&mut rng).expect("failed to generate");
            prop_assert_eq!(message.kind(), MessageKind::ObjectDefinition);
            let Payload::Definition(definition) = message.payload else {
                return Err(proptest::test_runner::TestCaseError::fail(
                    "definition kind with non-definition payload",
                ));
            };
            prop_assert_eq!(definition.object_instance, 1);
            prop_assert_eq!(generator.live_objects(), 1);
        }

        // Replay a long run against shadow bookkeeping and check every
        // structural invariant the consumer relies on.
        #[test]
        fn long_runs_hold_invariants(seed: u64) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut generator = BacnetGenerator::new();

            let mut live: HashSet<ObjectKey> = HashSet::new();
            let mut kinds: HashMap<ObjectKey, ValueKind> = HashMap::new();
            let mut last_instance: HashMap<ObjectType, u32> = HashMap::new();

            for _ in 0..1_000 {
                let message = generator.generate(&mut rng).expect("failed to generate");
                match message.payload {
                    Payload::Definition(definition) => {
                        let key = (definition.object_type, definition.object_instance);
                        let previous = last_instance
                            .insert(definition.object_type, definition.object_instance);
                        prop_assert_eq!(
                            definition.object_instance,
                            previous.unwrap_or(0) + 1,
                            "instances must be allocated sequentially per type"
                        );
                        prop_assert!(live.insert(key), "definition for an already-live key");
                        kinds.insert(key, definition.present_value_type);

                        prop_assert_eq!(
                            definition.present_value_type,
                            definition.object_type.value_kind()
                        );
                        prop_assert_eq!(
                            definition.initial_value.kind(),
                            definition.present_value_type
                        );
                        prop_assert!(definition.object_type.units().iter().any(
                            |(code, text)| *code == definition.units
                                && *text == definition.units_text
                        ));
                        prop_assert_eq!(
                            &definition.object_name,
                            &definition.object_type.object_name(definition.object_instance)
                        );
                        match definition.initial_value {
                            PointValue::Real(value) => {
                                prop_assert!((0.0..100.0).contains(&value));
                                prop_assert!(definition.cov_increment.is_some());
                            }
                            PointValue::Boolean(_) | PointValue::Unsigned(_) => {
                                prop_assert!(definition.cov_increment.is_none());
                            }
                        }
                        if let PointValue::Unsigned(state) = definition.initial_value {
                            prop_assert!((1..=5).contains(&state));
                        }
                    }
                    Payload::Update(update) => {
                        let key = (update.object_type, update.object_instance);
                        prop_assert!(live.contains(&key), "update for a key that is not live");
                        prop_assert_eq!(update.present_value.kind(), kinds[&key]);
                        match update.present_value {
                            PointValue::Real(value) => {
                                prop_assert!((0.0..=100.0).contains(&value));
                            }
                            PointValue::Unsigned(state) => {
                                prop_assert!((1..=5).contains(&state));
                            }
                            PointValue::Boolean(_) => {}
                        }
                        let flagged = update.status_flags.in_alarm || update.status_flags.fault;
                        prop_assert_eq!(
                            update.quality,
                            if flagged { Quality::Uncertain } else { Quality::Good }
                        );
                        prop_assert!(!update.status_flags.overridden);
                        prop_assert!(!update.status_flags.out_of_service);
                    }
                    Payload::Delete(delete) => {
                        let key = (delete.object_type, delete.object_instance);
                        prop_assert!(
                            live.len() > DELETE_FLOOR,
                            "delete issued with only {} live objects",
                            live.len()
                        );
                        prop_assert!(live.remove(&key), "delete for a key that is not live");
                        prop_assert_eq!(delete.reason.as_str(), "load-test-cleanup");
                    }
                }
            }

            prop_assert_eq!(generator.live_objects(), live.len());
        }

        // The same seed replays the same event sequence; only envelope
        // timestamps differ between runs.
        #[test]
        fn seeded_runs_are_reproducible(seed: u64) {
            let run = |seed: u64| -> Vec<(MessageKind, Payload)> {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut generator = BacnetGenerator::new();
                (0..200)
                    .map(|_| {
                        let message = generator.generate(&mut rng).expect("failed to generate");
                        (message.kind(), message.payload)
                    })
                    .collect()
            };
            prop_assert_eq!(run(seed), run(seed));
        }
    }

    #[test]
    fn updates_dominate_a_long_run() {
        let mut rng = SmallRng::seed_from_u64(1_024);
        let mut generator = BacnetGenerator::new();
        let mut definitions = 0u32;
        let mut updates = 0u32;
        let mut deletes = 0u32;
        for _ in 0..10_000 {
            let message = generator.generate(&mut rng).expect("failed to generate");
            match message.kind() {
                MessageKind::ObjectDefinition => definitions += 1,
                MessageKind::ValueUpdate => updates += 1,
                MessageKind::ObjectDelete => deletes += 1,
            }
        }
        assert!(
            updates > definitions,
            "{updates} updates vs {definitions} definitions"
        );
        assert!(
            definitions > deletes,
            "{definitions} definitions vs {deletes} deletes"
        );
    }

    #[test]
    fn delete_removes_the_key() {
        let mut generator = BacnetGenerator::new();
        let key = (ObjectType::AnalogInput, 1);
        generator.objects.insert(key, PointValue::Real(50.0));
        let message = generator.delete(key).expect("failed to delete");
        assert_eq!(message.kind(), MessageKind::ObjectDelete);
        assert_eq!(generator.live_objects(), 0);
    }

    #[test]
    fn real_updates_stay_clamped_under_drift() {
        // Start a point at the bottom of range and update it repeatedly; the
        // walk must never escape [0, 100] no matter how the noise lands.
        let mut rng = SmallRng::seed_from_u64(7);
        let mut generator = BacnetGenerator::new();
        let key = (ObjectType::AnalogValue, 1);
        generator.objects.insert(key, PointValue::Real(0.0));
        for _ in 0..500 {
            let message = generator
                .update_existing(&mut rng, key)
                .expect("failed to update");
            let Payload::Update(update) = message.payload else {
                panic!("update produced a non-update payload");
            };
            let PointValue::Real(value) = update.present_value else {
                panic!("real point produced a non-real value");
            };
            assert!(
                (0.0..=100.0).contains(&value),
                "value escaped range: {value}"
            );
        }
    }
}
