use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};

use crate::container::{string_attribute, u64_attribute, Container, MemoryContainer};
use crate::layout::{FileLayout, FileLayoutParams, MIN_SOURCE_ID_VERSION};
use crate::payload::{OpaquePayloads, PayloadParser};
use crate::resolver::{SourceIdGeoIdMap, SourceIdResolver};

use super::{
    IndexConfig, IndexError, RawDataFile, SchemaEra, FILELAYOUT_PARAMS, FILELAYOUT_VERSION,
    RECORDED_SIZE, RECORD_TYPE,
};

impl RawDataFile<MemoryContainer, OpaquePayloads> {
    /// Open a JSON container snapshot from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        Self::open_with_config(path, IndexConfig::default())
    }

    /// Open a JSON container snapshot with custom configuration
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: IndexConfig,
    ) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let container = MemoryContainer::open(path).map_err(|source| IndexError::OpenFailure {
            file: path.display().to_string(),
            source,
        })?;
        Self::with_config(container, config)
    }
}

impl<C: Container> RawDataFile<C, OpaquePayloads> {
    /// Index an opened container, leaving payloads as raw bytes
    pub fn new(container: C) -> Result<Self, IndexError> {
        Self::with_config(container, IndexConfig::default())
    }

    /// Index an opened container with custom configuration
    pub fn with_config(container: C, config: IndexConfig) -> Result<Self, IndexError> {
        Self::with_parser(container, OpaquePayloads, config)
    }
}

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Index an opened container, parsing payloads with `parser`.
    ///
    /// Reads the optional size attribute, the file layout and the record
    /// type, checks that the record type agrees with the layout (version ≥ 2
    /// only), and resolves the file-level geometric id map.
    pub fn with_parser(container: C, parser: P, config: IndexConfig) -> Result<Self, IndexError> {
        let recorded_size = u64_attribute(&container, "/", RECORDED_SIZE)?.unwrap_or(0);

        let layout = read_file_layout(&container);

        let record_type = string_attribute(&container, "/", RECORD_TYPE)?
            .unwrap_or_else(|| layout.record_name_prefix().to_string());

        check_file_layout(&layout, &record_type)?;

        let mut file_level_geo_ids = SourceIdGeoIdMap::new();
        SourceIdResolver::new(&layout)
            .fetch_file_level_geo_id_info(&container, &mut file_level_geo_ids);

        debug!(
            "Indexed {}: version {}, record type {}, {} file-level source ids with geo ids",
            container.file_name(),
            layout.version(),
            record_type,
            file_level_geo_ids.len()
        );

        Ok(Self {
            container,
            parser,
            config,
            era: SchemaEra::for_version(layout.version()),
            layout,
            recorded_size,
            record_type,
            file_level_geo_ids,
            record_groups: None,
            record_cache: BTreeMap::new(),
        })
    }

    /// Name of the underlying file
    pub fn file_name(&self) -> &str {
        self.container.file_name()
    }

    /// Underlying container
    pub fn container(&self) -> &C {
        &self.container
    }
}

/// Build the layout descriptor from the root attributes. Files without
/// layout metadata get version 0 and default parameters.
fn read_file_layout<C: Container>(container: &C) -> FileLayout {
    let params = match string_attribute(container, "/", FILELAYOUT_PARAMS) {
        Ok(Some(text)) => match FileLayoutParams::from_json_str(&text) {
            Ok(params) => params,
            Err(e) => {
                info!("Unreadable file layout in {}: {}", container.file_name(), e);
                return FileLayout::default();
            }
        },
        Ok(None) => {
            info!("Missing file layout in {}, assuming version 0", container.file_name());
            return FileLayout::default();
        }
        Err(e) => {
            info!("Unreadable file layout in {}: {}", container.file_name(), e);
            return FileLayout::default();
        }
    };

    let version = match container.attribute("/", FILELAYOUT_VERSION) {
        Ok(Some(value)) => value.as_u32(),
        _ => None,
    };
    let version = version.unwrap_or_else(|| {
        info!("Missing file layout version in {}, assuming 0", container.file_name());
        0
    });

    FileLayout::new(params, version)
}

fn check_file_layout(layout: &FileLayout, record_type: &str) -> Result<(), IndexError> {
    if layout.version() < MIN_SOURCE_ID_VERSION {
        return Ok(());
    }

    if record_type != layout.record_name_prefix() {
        return Err(IndexError::SchemaMismatch {
            declared: record_type.to_string(),
            expected: layout.record_name_prefix().to_string(),
        });
    }
    Ok(())
}
