//! Index-aligned storage for the birds of one episode.
//!
//! Entry `i` of `ids`, `birds` and `policies` always describes the same
//! member. Removal happens in one batch so indices stay valid for the whole
//! tick that decided them.

use std::collections::HashSet;

use flappy_shared::{FitnessRecord, GenomeId};

use crate::bird::Bird;
use crate::config::BirdConfig;
use crate::error::SimError;
use crate::policy::Policy;

pub struct Population<P> {
    ids: Vec<GenomeId>,
    birds: Vec<Bird>,
    policies: Vec<P>,
    /// Position of each id in the harness's original ordering
    order: Vec<usize>,
    retired: Vec<(usize, FitnessRecord)>,
}

impl<P: Policy> Population<P> {
    pub fn new(
        members: impl IntoIterator<Item = (GenomeId, P)>,
        config: BirdConfig,
    ) -> Result<Self, SimError> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut policies = Vec::new();
        for (id, policy) in members {
            if !seen.insert(id) {
                return Err(SimError::DuplicateId(id));
            }
            ids.push(id);
            policies.push(policy);
        }
        if ids.is_empty() {
            return Err(SimError::EmptyPopulation);
        }

        let birds = ids.iter().map(|_| Bird::new(config)).collect();
        let order = (0..ids.len()).collect();
        Ok(Self {
            ids,
            birds,
            policies,
            order,
            retired: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.birds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.birds.is_empty()
    }

    pub fn ids(&self) -> &[GenomeId] {
        &self.ids
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn birds_mut(&mut self) -> &mut [Bird] {
        &mut self.birds
    }

    pub fn policies(&self) -> &[P] {
        &self.policies
    }

    /// Split borrow so a pass can read policies while mutating birds.
    pub fn members_mut(&mut self) -> (&[GenomeId], &mut [Bird], &[P]) {
        (&self.ids, &mut self.birds, &self.policies)
    }

    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|b| b.alive).count()
    }

    /// Drop every member at `indices` from all collections at once.
    ///
    /// Survivors keep their relative order. Out-of-range and repeated indices are
    /// ignored. Removed members are kept as fitness records.
    pub fn remove_batch(&mut self, indices: &[usize]) -> Vec<FitnessRecord> {
        let mut doomed = vec![false; self.len()];
        for &i in indices {
            if let Some(slot) = doomed.get_mut(i) {
                *slot = true;
            }
        }
        if !doomed.contains(&true) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        for (i, _) in doomed.iter().enumerate().filter(|(_, d)| **d) {
            let record = record_for(self.ids[i], &self.birds[i]);
            self.retired.push((self.order[i], record.clone()));
            removed.push(record);
        }

        retain_by_mask(&mut self.ids, &doomed);
        retain_by_mask(&mut self.birds, &doomed);
        retain_by_mask(&mut self.policies, &doomed);
        retain_by_mask(&mut self.order, &doomed);
        removed
    }

    /// Remove every dead bird. Returns what was removed.
    pub fn remove_dead(&mut self) -> Vec<FitnessRecord> {
        let dead: Vec<usize> = self
            .birds
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.alive)
            .map(|(i, _)| i)
            .collect();
        self.remove_batch(&dead)
    }

    /// All records, retired and still flying, in the original member order.
    pub fn into_records(self) -> Vec<FitnessRecord> {
        let mut all = self.retired;
        all.extend(
            self.order
                .iter()
                .zip(self.ids.iter().zip(self.birds.iter()))
                .map(|(&pos, (&id, bird))| (pos, record_for(id, bird))),
        );
        all.sort_by_key(|(pos, _)| *pos);
        all.into_iter().map(|(_, record)| record).collect()
    }
}

fn record_for(id: GenomeId, bird: &Bird) -> FitnessRecord {
    FitnessRecord {
        id,
        score: bird.score,
        cause: bird.cause,
        ticks_survived: bird.ticks_alive,
    }
}

fn retain_by_mask<T>(items: &mut Vec<T>, doomed: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !doomed[index];
        index += 1;
        keep
    });
}
