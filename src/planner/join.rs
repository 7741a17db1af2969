//! # Join Planner
//!
//! Merges join descriptors across every instruction of one request. Two
//! chains are the same join only when their whole sequence of join keys
//! matches from the root, so `student.school` reached from a filter and from
//! an include is joined once, while two relationships to the same target
//! always stay apart.
//!
//! Aliases: the target model name when it is free and the join needs no
//! alias, otherwise the first free `<target>_<n>`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::model::{JoinDescriptor, JoinKey};

use super::plan::Scope;

/// A join as it will be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedJoin {
    pub id: usize,
    /// Join this one hangs off; `None` for the root
    pub parent: Option<usize>,
    pub descriptor: JoinDescriptor,
    pub alias: String,
}

impl PlannedJoin {
    pub fn parent_scope(&self) -> Scope {
        self.parent.map_or(Scope::Root, Scope::Join)
    }
}

pub struct JoinPlanner {
    root_model: String,
    root_alias: String,
    joins: Vec<PlannedJoin>,
    chains: HashMap<Vec<JoinKey>, usize>,
    aliases: HashSet<String>,
    reused: u64,
}

impl JoinPlanner {
    pub fn new(root_model: impl Into<String>) -> Self {
        let root_model = root_model.into();
        let mut aliases = HashSet::new();
        aliases.insert(root_model.clone());

        Self {
            root_alias: root_model.clone(),
            root_model,
            joins: Vec::new(),
            chains: HashMap::new(),
            aliases,
            reused: 0,
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Plan a chain and return the scope of its last hop
    pub fn plan(&mut self, descriptors: &[JoinDescriptor]) -> QueryResult<Scope> {
        let ids = self.plan_chain(descriptors)?;
        Ok(ids.last().map_or(Scope::Root, |id| Scope::Join(*id)))
    }

    /// Plan a chain and return the planned join of every hop
    pub fn plan_chain(&mut self, descriptors: &[JoinDescriptor]) -> QueryResult<Vec<usize>> {
        let mut ids = Vec::with_capacity(descriptors.len());
        let mut keys = Vec::with_capacity(descriptors.len());
        let mut parent: Option<usize> = None;
        let mut source = self.root_model.clone();

        for descriptor in descriptors {
            if descriptor.source != source {
                return Err(QueryError::ambiguous_join(format!(
                    "Join '{}' does not continue from model '{}'.",
                    descriptor.key, source
                )));
            }

            keys.push(descriptor.key.clone());

            let id = match self.chains.get(&keys) {
                Some(&id) => {
                    if self.joins[id].descriptor != *descriptor {
                        return Err(QueryError::ambiguous_join(format!(
                            "Join '{}' was planned twice with different conditions.",
                            descriptor.key
                        )));
                    }
                    self.reused += 1;
                    id
                }
                None => {
                    let id = self.joins.len();
                    let alias = self.alias_for(descriptor);
                    self.joins.push(PlannedJoin {
                        id,
                        parent,
                        descriptor: descriptor.clone(),
                        alias,
                    });
                    self.chains.insert(keys.clone(), id);
                    id
                }
            };

            ids.push(id);
            parent = Some(id);
            source = descriptor.target.clone();
        }

        Ok(ids)
    }

    fn alias_for(&mut self, descriptor: &JoinDescriptor) -> String {
        let target = &descriptor.target;

        if !descriptor.needs_alias() && !self.aliases.contains(target) {
            self.aliases.insert(target.clone());
            return target.clone();
        }

        let alias = (1..)
            .map(|n| format!("{}_{}", target, n))
            .find(|candidate| !self.aliases.contains(candidate))
            .unwrap_or_else(|| format!("{}_{}", target, self.joins.len()));
        self.aliases.insert(alias.clone());
        alias
    }

    /// Alias of a scope planned so far
    pub fn alias(&self, scope: Scope) -> &str {
        match scope {
            Scope::Root => &self.root_alias,
            Scope::Join(id) => self
                .joins
                .get(id)
                .map_or(self.root_alias.as_str(), |j| j.alias.as_str()),
        }
    }

    /// Chains served by an already planned join
    pub fn reused(&self) -> u64 {
        self.reused
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn into_joins(self) -> Vec<PlannedJoin> {
        self.joins
    }
}
