use crate::{ElementType, ExternalIdentity, ParseError, Sink, Source, ThingNode, ValidationError};
use std::collections::{HashMap, HashSet};

/// The single JSON document authors write: `{element_types, thing_nodes,
/// sources, sinks}`. Every structural and referential invariant is enforced
/// by [`Self::validate`] before the document is allowed to reach the
/// persistence layer.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteStructure {
    #[serde(default)]
    pub element_types: Vec<ElementType>,
    #[serde(default)]
    pub thing_nodes: Vec<ThingNode>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub sinks: Vec<Sink>,
}

impl CompleteStructure {
    pub fn from_json(raw: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Runs every invariant and returns the first violation found, in the
    /// order below. Purely structural/referential — never touches a
    /// database.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.element_types.is_empty() {
            return Err(ValidationError::new("element_types must not be empty"));
        }

        self.check_non_empty_identities()?;
        self.check_unique_external_identity(&self.element_types, "element_type")?;
        self.check_unique_external_identity(&self.thing_nodes, "thing_node")?;
        self.check_unique_external_identity(&self.sources, "source")?;
        self.check_unique_external_identity(&self.sinks, "sink")?;
        self.check_unique_names(self.element_types.iter().map(|e| e.name.as_str()), "element_type")?;
        self.check_unique_names(self.thing_nodes.iter().map(|n| n.name.as_str()), "thing_node")?;
        self.check_unique_names(self.sources.iter().map(|s| s.name.as_str()), "source")?;
        self.check_unique_names(self.sinks.iter().map(|s| s.name.as_str()), "sink")?;

        let nodes_by_external_id: HashMap<&str, &ThingNode> = self
            .thing_nodes
            .iter()
            .map(|n| (n.external_id.as_str(), n))
            .collect();
        let element_type_ids: HashSet<(&str, &str)> = self
            .element_types
            .iter()
            .map(|e| (e.stakeholder_key.as_str(), e.external_id.as_str()))
            .collect();

        self.check_parent_references_resolve(&nodes_by_external_id)?;
        self.check_element_type_references_resolve(&element_type_ids)?;
        Self::check_no_cycles(&nodes_by_external_id)?;
        Self::check_stakeholder_homogeneity(&nodes_by_external_id)?;

        self.check_endpoint_thing_node_refs(
            self.sources.iter().map(|s| (s.external_id.as_str(), &s.thing_node_external_ids)),
            "source",
            &nodes_by_external_id,
        )?;
        self.check_endpoint_thing_node_refs(
            self.sinks.iter().map(|s| (s.external_id.as_str(), &s.thing_node_external_ids)),
            "sink",
            &nodes_by_external_id,
        )?;
        self.check_filter_internal_names(self.sources.iter().map(|s| (s.external_id.as_str(), &s.passthrough_filters)), "source")?;
        self.check_filter_internal_names(self.sinks.iter().map(|s| (s.external_id.as_str(), &s.passthrough_filters)), "sink")?;
        self.check_filter_field_charsets()?;

        Ok(())
    }

    fn check_non_empty_identities(&self) -> Result<(), ValidationError> {
        fn check<T: ExternalIdentity>(items: &[T], kind: &str, name_of: impl Fn(&T) -> &str) -> Result<(), ValidationError> {
            for item in items {
                if item.external_id().is_empty() {
                    return Err(ValidationError::new(format!("{kind} has an empty external_id")));
                }
                if item.stakeholder_key().is_empty() {
                    return Err(ValidationError::new(format!(
                        "{kind} '{}' has an empty stakeholder_key",
                        item.external_id()
                    )));
                }
                if name_of(item).is_empty() {
                    return Err(ValidationError::new(format!(
                        "{kind} '{}' has an empty name",
                        item.external_id()
                    )));
                }
            }
            Ok(())
        }
        check(&self.element_types, "element_type", |e| e.name.as_str())?;
        check(&self.thing_nodes, "thing_node", |n| n.name.as_str())?;
        check(&self.sources, "source", |s| s.name.as_str())?;
        check(&self.sinks, "sink", |s| s.name.as_str())?;
        Ok(())
    }

    fn check_unique_external_identity<T: ExternalIdentity>(
        &self,
        items: &[T],
        kind: &str,
    ) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for item in items {
            let key = (item.stakeholder_key(), item.external_id());
            if !seen.insert(key) {
                return Err(ValidationError::new(format!(
                    "duplicate (stakeholder_key, external_id) pair for {kind}: ({}, {})",
                    item.stakeholder_key(),
                    item.external_id()
                )));
            }
        }
        Ok(())
    }

    fn check_unique_names<'a>(
        &self,
        names: impl Iterator<Item = &'a str>,
        kind: &str,
    ) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                return Err(ValidationError::new(format!(
                    "duplicate {kind} name: '{name}'"
                )));
            }
        }
        Ok(())
    }

    fn check_parent_references_resolve(
        &self,
        nodes_by_external_id: &HashMap<&str, &ThingNode>,
    ) -> Result<(), ValidationError> {
        for node in &self.thing_nodes {
            if let Some(parent) = &node.parent_external_node_id {
                if !nodes_by_external_id.contains_key(parent.as_str()) {
                    return Err(ValidationError::new(format!(
                        "thing_node '{}' references parent_external_node_id '{parent}' which does not resolve to any thing_node in the document",
                        node.external_id
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_element_type_references_resolve(
        &self,
        element_type_ids: &HashSet<(&str, &str)>,
    ) -> Result<(), ValidationError> {
        for node in &self.thing_nodes {
            let key = (node.stakeholder_key.as_str(), node.element_type_external_id.as_str());
            if !element_type_ids.contains(&key) {
                return Err(ValidationError::new(format!(
                    "thing_node '{}' references element_type_external_id '{}' which does not resolve to any element_type with stakeholder_key '{}' in the document",
                    node.external_id, node.element_type_external_id, node.stakeholder_key
                )));
            }
        }
        Ok(())
    }

    fn check_no_cycles(nodes_by_external_id: &HashMap<&str, &ThingNode>) -> Result<(), ValidationError> {
        for start in nodes_by_external_id.values() {
            let mut visited = HashSet::new();
            visited.insert(start.external_id.as_str());
            let mut current = *start;
            while let Some(parent_ext) = &current.parent_external_node_id {
                if !visited.insert(parent_ext.as_str()) {
                    return Err(ValidationError::new(format!(
                        "Circular reference detected in parent chain starting at thing_node '{}'",
                        start.external_id
                    )));
                }
                current = *nodes_by_external_id
                    .get(parent_ext.as_str())
                    .expect("parent existence already validated");
            }
        }
        Ok(())
    }

    fn check_stakeholder_homogeneity(
        nodes_by_external_id: &HashMap<&str, &ThingNode>,
    ) -> Result<(), ValidationError> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut roots = Vec::new();
        for node in nodes_by_external_id.values() {
            match &node.parent_external_node_id {
                None => roots.push(*node),
                Some(parent) => children.entry(parent.as_str()).or_default().push(node.external_id.as_str()),
            }
        }

        for root in roots {
            let mut stack = vec![root.external_id.as_str()];
            while let Some(external_id) = stack.pop() {
                let node = nodes_by_external_id[external_id];
                if node.stakeholder_key != root.stakeholder_key {
                    return Err(ValidationError::new(format!(
                        "thing_node '{}' has stakeholder_key '{}' but is reachable from root '{}' with stakeholder_key '{}'",
                        node.external_id, node.stakeholder_key, root.external_id, root.stakeholder_key
                    )));
                }
                if let Some(kids) = children.get(external_id) {
                    stack.extend(kids.iter().copied());
                }
            }
        }
        Ok(())
    }

    fn check_endpoint_thing_node_refs<'a>(
        &self,
        endpoints: impl Iterator<Item = (&'a str, &'a Vec<String>)>,
        kind: &str,
        nodes_by_external_id: &HashMap<&str, &ThingNode>,
    ) -> Result<(), ValidationError> {
        for (external_id, refs) in endpoints {
            let mut seen = HashSet::new();
            for thing_node_id in refs {
                if !seen.insert(thing_node_id) {
                    return Err(ValidationError::new(format!(
                        "{kind} '{external_id}' lists thing_node_external_ids entry '{thing_node_id}' more than once"
                    )));
                }
                if !nodes_by_external_id.contains_key(thing_node_id.as_str()) {
                    return Err(ValidationError::new(format!(
                        "{kind} '{external_id}' references thing_node_external_ids entry '{thing_node_id}' which does not exist as a thing_node in the document"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_filter_internal_names<'a>(
        &self,
        endpoints: impl Iterator<Item = (&'a str, &'a Vec<crate::Filter>)>,
        kind: &str,
    ) -> Result<(), ValidationError> {
        for (external_id, filters) in endpoints {
            let mut seen = HashSet::new();
            for filter in filters {
                let internal_name = filter.internal_name();
                if !seen.insert(internal_name.clone()) {
                    return Err(ValidationError::new(format!(
                        "{kind} '{external_id}' has duplicate passthrough_filter internal_name '{internal_name}'"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_filter_field_charsets(&self) -> Result<(), ValidationError> {
        fn is_valid_name(s: &str) -> bool {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c.is_whitespace())
        }
        fn is_valid_internal_name(s: &str) -> bool {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
        }
        for filter in self
            .sources
            .iter()
            .flat_map(|s| s.passthrough_filters.iter())
            .chain(self.sinks.iter().flat_map(|s| s.passthrough_filters.iter()))
        {
            if !is_valid_name(&filter.name) {
                return Err(ValidationError::new(format!(
                    "filter name '{}' must be alphanumeric, underscore, or whitespace",
                    filter.name
                )));
            }
            if !is_valid_internal_name(&filter.internal_name()) {
                return Err(ValidationError::new(format!(
                    "filter internal_name '{}' must be alphanumeric or underscore",
                    filter.internal_name()
                )));
            }
        }
        Ok(())
    }
}
