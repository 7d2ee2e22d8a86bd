use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{path_elements, AttributeValue, Container, ContainerError, NodeKind};

/// Group node of a [`MemoryContainer`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGroup {
    /// Attributes attached to the group
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Child objects, listed in name order
    #[serde(default)]
    pub children: BTreeMap<String, MemoryNode>,
}

/// Dataset node of a [`MemoryContainer`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDataset {
    /// Attributes attached to the dataset
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Raw dataset bytes
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Any node below the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemoryNode {
    /// A group
    Group(MemoryGroup),
    /// A dataset
    Dataset(MemoryDataset),
}

enum NodeRef<'a> {
    Group(&'a MemoryGroup),
    Dataset(&'a MemoryDataset),
}

enum NodeMut<'a> {
    Group(&'a mut MemoryGroup),
    Dataset(&'a mut MemoryDataset),
}

/// In-memory container.
///
/// Serialises to and from a JSON snapshot:
///
/// ```json
/// {
///   "name": "run000123.hdf5",
///   "root": {
///     "attributes": { "filelayout_version": 4, "record_type": "TriggerRecord" },
///     "children": {
///       "TriggerRecord00001.0000": { "kind": "group", "children": { ... } }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryContainer {
    name: String,
    #[serde(default)]
    root: MemoryGroup,
}

impl MemoryContainer {
    /// Create an empty container with the given file name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: MemoryGroup::default(),
        }
    }

    /// Load a JSON snapshot from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ContainerError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON snapshot
    pub fn from_json_str(content: &str) -> Result<Self, ContainerError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Render the container as a JSON snapshot
    pub fn to_json_string(&self) -> Result<String, ContainerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Root group
    pub fn root(&self) -> &MemoryGroup {
        &self.root
    }

    /// Create the group at `path` along with any missing parents.
    ///
    /// Returns the existing group when one is already there.
    pub fn add_group(&mut self, path: &str) -> Result<&mut MemoryGroup, ContainerError> {
        let mut group = &mut self.root;
        for element in path_elements(path) {
            let node = group
                .children
                .entry(element.to_string())
                .or_insert_with(|| MemoryNode::Group(MemoryGroup::default()));
            group = match node {
                MemoryNode::Group(g) => g,
                MemoryNode::Dataset(_) => {
                    return Err(ContainerError::PathConflict(path.to_string()))
                }
            };
        }
        Ok(group)
    }

    /// Create a dataset at `path`, creating parent groups as needed
    pub fn add_dataset(
        &mut self,
        path: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ContainerError> {
        let elements = path_elements(path);
        let (name, parents) = elements
            .split_last()
            .ok_or_else(|| ContainerError::PathConflict(path.to_string()))?;
        let parent = self.add_group(&parents.join("/"))?;

        match parent.children.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ContainerError::PathConflict(path.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(MemoryNode::Dataset(MemoryDataset {
                    attributes: BTreeMap::new(),
                    data: data.into(),
                }));
                Ok(())
            }
        }
    }

    /// Set an attribute on an existing group or dataset
    pub fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), ContainerError> {
        let attributes = match self.find_mut(path) {
            Some(NodeMut::Group(g)) => &mut g.attributes,
            Some(NodeMut::Dataset(d)) => &mut d.attributes,
            None => return Err(ContainerError::NotFound(path.to_string())),
        };
        attributes.insert(name.to_string(), value.into());
        Ok(())
    }

    fn find(&self, path: &str) -> Option<NodeRef<'_>> {
        let mut current = NodeRef::Group(&self.root);
        for element in path_elements(path) {
            let NodeRef::Group(group) = current else {
                return None;
            };
            current = match group.children.get(element)? {
                MemoryNode::Group(g) => NodeRef::Group(g),
                MemoryNode::Dataset(d) => NodeRef::Dataset(d),
            };
        }
        Some(current)
    }

    fn find_mut(&mut self, path: &str) -> Option<NodeMut<'_>> {
        let mut current = NodeMut::Group(&mut self.root);
        for element in path_elements(path) {
            let NodeMut::Group(group) = current else {
                return None;
            };
            current = match group.children.get_mut(element)? {
                MemoryNode::Group(g) => NodeMut::Group(g),
                MemoryNode::Dataset(d) => NodeMut::Dataset(d),
            };
        }
        Some(current)
    }

    fn dataset(&self, path: &str) -> Result<&MemoryDataset, ContainerError> {
        match self.find(path) {
            Some(NodeRef::Dataset(d)) => Ok(d),
            Some(NodeRef::Group(_)) => Err(ContainerError::NotADataset(path.to_string())),
            None => Err(ContainerError::NotFound(path.to_string())),
        }
    }
}

impl Container for MemoryContainer {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn node_kind(&self, path: &str) -> Option<NodeKind> {
        self.find(path).map(|node| match node {
            NodeRef::Group(_) => NodeKind::Group,
            NodeRef::Dataset(_) => NodeKind::Dataset,
        })
    }

    fn attribute(&self, path: &str, name: &str) -> Result<Option<AttributeValue>, ContainerError> {
        let attributes = match self.find(path) {
            Some(NodeRef::Group(g)) => &g.attributes,
            Some(NodeRef::Dataset(d)) => &d.attributes,
            None => return Err(ContainerError::NotFound(path.to_string())),
        };
        Ok(attributes.get(name).cloned())
    }

    fn list_children(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        match self.find(group_path) {
            Some(NodeRef::Group(g)) => Ok(g.children.keys().cloned().collect()),
            Some(NodeRef::Dataset(_)) => Err(ContainerError::NotAGroup(group_path.to_string())),
            None => Err(ContainerError::NotFound(group_path.to_string())),
        }
    }

    fn dataset_byte_size(&self, path: &str) -> Result<usize, ContainerError> {
        Ok(self.dataset(path)?.data.len())
    }

    fn read_dataset_bytes(&self, path: &str, buf: &mut [u8]) -> Result<(), ContainerError> {
        let dataset = self.dataset(path)?;
        if buf.len() != dataset.data.len() {
            return Err(ContainerError::BufferSize {
                path: path.to_string(),
                expected: dataset.data.len(),
                actual: buf.len(),
            });
        }
        buf.copy_from_slice(&dataset.data);
        Ok(())
    }
}
