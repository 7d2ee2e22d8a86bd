//! # Container Accessor
//!
//! Narrow read-only view of a hierarchical, self-describing binary container
//! (groups, datasets and attributes). The index never opens or interprets the
//! file format itself; it only speaks this trait.
//!
//! Paths are absolute and `/`-separated, with `/` naming the root group.
//!
//! [`MemoryContainer`] is an in-memory implementation backed by a JSON
//! snapshot, used for fixtures and for embedding pre-extracted files.

mod error;
mod memory;


pub use error::ContainerError;
pub use memory::{MemoryContainer, MemoryDataset, MemoryGroup, MemoryNode};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Kind of object found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node with named children
    Group,
    /// Leaf node holding bytes
    Dataset,
}

/// Scalar attribute value attached to a group or dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Unsigned integer
    UInt(u64),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// UTF-8 string (JSON blobs are stored this way)
    Str(String),
}

impl AttributeValue {
    /// String content, if this is a string attribute
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer content
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            AttributeValue::UInt(v) => Some(v),
            AttributeValue::Int(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Integer content that fits in 32 bits
    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::UInt(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::UInt(u64::from(value))
    }
}

/// Read-only access to a hierarchical container.
///
/// Implementations must be deterministic: `list_children` returns the same
/// names in the same order for as long as the container is alive.
pub trait Container {
    /// Name of the underlying file, used in diagnostics
    fn file_name(&self) -> &str;

    /// Kind of the object at `path`, or `None` when nothing exists there
    fn node_kind(&self, path: &str) -> Option<NodeKind>;

    /// Attribute `name` on the object at `path`, `None` when it is not set
    fn attribute(&self, path: &str, name: &str) -> Result<Option<AttributeValue>, ContainerError>;

    /// Names of the immediate children of the group at `group_path`
    fn list_children(&self, group_path: &str) -> Result<Vec<String>, ContainerError>;

    /// Storage size of the dataset at `path`
    fn dataset_byte_size(&self, path: &str) -> Result<usize, ContainerError>;

    /// Copy the dataset at `path` into `buf`, which must be exactly
    /// [`dataset_byte_size`](Container::dataset_byte_size) bytes long.
    fn read_dataset_bytes(&self, path: &str, buf: &mut [u8]) -> Result<(), ContainerError>;

    /// True when the attribute is set
    fn has_attribute(&self, path: &str, name: &str) -> Result<bool, ContainerError> {
        Ok(self.attribute(path, name)?.is_some())
    }

    /// True when `path` is a group
    fn is_group(&self, path: &str) -> bool {
        self.node_kind(path) == Some(NodeKind::Group)
    }

    /// True when `path` is a dataset
    fn is_dataset(&self, path: &str) -> bool {
        self.node_kind(path) == Some(NodeKind::Dataset)
    }

    /// Kind of the child `name` of the group at `group_path`
    fn child_kind(&self, group_path: &str, name: &str) -> Option<NodeKind> {
        self.node_kind(&join_path(group_path, name))
    }

    /// Read a whole dataset into a freshly allocated buffer
    fn read_dataset(&self, path: &str) -> Result<Bytes, ContainerError> {
        let size = self.dataset_byte_size(path)?;
        let mut buf = vec![0u8; size];
        self.read_dataset_bytes(path, &mut buf)?;
        Ok(Bytes::from(buf))
    }
}

impl<C: Container + ?Sized> Container for Box<C> {
    fn file_name(&self) -> &str {
        (**self).file_name()
    }

    fn node_kind(&self, path: &str) -> Option<NodeKind> {
        (**self).node_kind(path)
    }

    fn attribute(&self, path: &str, name: &str) -> Result<Option<AttributeValue>, ContainerError> {
        (**self).attribute(path, name)
    }

    fn list_children(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        (**self).list_children(group_path)
    }

    fn dataset_byte_size(&self, path: &str) -> Result<usize, ContainerError> {
        (**self).dataset_byte_size(path)
    }

    fn read_dataset_bytes(&self, path: &str, buf: &mut [u8]) -> Result<(), ContainerError> {
        (**self).read_dataset_bytes(path, buf)
    }
}

/// Join a group path and a child name with exactly one separator
pub fn join_path(group_path: &str, name: &str) -> String {
    let parent = group_path.trim_end_matches('/');
    let child = name.trim_start_matches('/');
    format!("{}/{}", parent, child)
}

/// Split a path into its non-empty elements
pub fn path_elements(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collect the paths of every dataset below `group_path`, depth first in
/// listing order. Paths are absolute.
pub fn collect_dataset_paths<C: Container + ?Sized>(
    container: &C,
    group_path: &str,
    paths: &mut Vec<String>,
) -> Result<(), ContainerError> {
    for child in container.list_children(group_path)? {
        let child_path = join_path(group_path, &child);
        match container.node_kind(&child_path) {
            Some(NodeKind::Dataset) => paths.push(child_path),
            Some(NodeKind::Group) => collect_dataset_paths(container, &child_path, paths)?,
            None => {}
        }
    }
    Ok(())
}

/// Read a string attribute, `None` when unset
pub fn string_attribute<C: Container + ?Sized>(
    container: &C,
    path: &str,
    name: &str,
) -> Result<Option<String>, ContainerError> {
    match container.attribute(path, name)? {
        None => Ok(None),
        Some(AttributeValue::Str(s)) => Ok(Some(s)),
        Some(_) => Err(ContainerError::AttributeType {
            path: path.to_string(),
            name: name.to_string(),
            expected: "a string",
        }),
    }
}

/// Read an unsigned integer attribute, `None` when unset
pub fn u64_attribute<C: Container + ?Sized>(
    container: &C,
    path: &str,
    name: &str,
) -> Result<Option<u64>, ContainerError> {
    match container.attribute(path, name)? {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ContainerError::AttributeType {
                path: path.to_string(),
                name: name.to_string(),
                expected: "an unsigned integer",
            }),
    }
}
