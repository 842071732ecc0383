//! Registry of the sidecar files that make up a shapefile dataset.
//!
//! A shapefile is never a single file: the geometry (`.shp`), the attribute table
//! (`.dbf`) and a handful of optional index and metadata files share one base name.
//! This module lists every role the importer recognizes and how the bundled decoder
//! treats it, in the same spirit as a format driver registry.

use std::fmt;

/// How the bundled decoder uses a file role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleUsage {
    /// The decoder cannot work without this file.
    Required,
    /// The decoder reads this file when it is present.
    Read,
    /// The file is collected but only reported, not interpreted.
    Reported,
    /// The file is collected and otherwise ignored.
    Ignored,
}

impl RoleUsage {
    /// Returns the string representation of this usage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RoleUsage::Required => "Required",
            RoleUsage::Read => "Read",
            RoleUsage::Reported => "Reported",
            RoleUsage::Ignored => "Ignored",
        }
    }
}

/// A recognized shapefile sidecar role, keyed by its three-letter extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileRole {
    /// Main file holding the geometry records.
    Shp,
    /// dBASE table holding the attribute records.
    Dbf,
    /// Index of the geometry records.
    Shx,
    /// Spatial index (ESRI).
    Sbn,
    /// Spatial index companion (ESRI).
    Sbx,
    /// Attribute index (ArcInfo).
    Aih,
    /// Attribute index companion (ArcInfo).
    Ain,
    /// Projection definition in WKT.
    Prj,
    /// Code page of the attribute table.
    Cpg,
    /// Geocoding index.
    Idx,
}

/// Every recognized role, in registry order.
pub const FILE_ROLES: [FileRole; 10] = [
    FileRole::Shp,
    FileRole::Dbf,
    FileRole::Shx,
    FileRole::Sbn,
    FileRole::Sbx,
    FileRole::Aih,
    FileRole::Ain,
    FileRole::Prj,
    FileRole::Cpg,
    FileRole::Idx,
];

impl FileRole {
    /// Looks up a role by its extension.
    ///
    /// The comparison is exact: extensions are matched with the case they were
    /// supplied in, so `SHP` is not recognized.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        FILE_ROLES
            .iter()
            .copied()
            .find(|role| role.extension() == extension)
    }

    /// The three-letter extension of this role.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            FileRole::Shp => "shp",
            FileRole::Dbf => "dbf",
            FileRole::Shx => "shx",
            FileRole::Sbn => "sbn",
            FileRole::Sbx => "sbx",
            FileRole::Aih => "aih",
            FileRole::Ain => "ain",
            FileRole::Prj => "prj",
            FileRole::Cpg => "cpg",
            FileRole::Idx => "idx",
        }
    }

    /// Human readable description of the file's content.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            FileRole::Shp => "Shape geometry records",
            FileRole::Dbf => "dBASE attribute table",
            FileRole::Shx => "Shape record index",
            FileRole::Sbn => "Spatial index",
            FileRole::Sbx => "Spatial index companion",
            FileRole::Aih => "Attribute index",
            FileRole::Ain => "Attribute index companion",
            FileRole::Prj => "Projection (WKT)",
            FileRole::Cpg => "Attribute table code page",
            FileRole::Idx => "Geocoding index",
        }
    }

    /// How the bundled decoder treats this role.
    #[must_use]
    pub const fn usage(&self) -> RoleUsage {
        match self {
            FileRole::Shp => RoleUsage::Required,
            FileRole::Dbf | FileRole::Prj => RoleUsage::Read,
            FileRole::Cpg => RoleUsage::Reported,
            _ => RoleUsage::Ignored,
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
