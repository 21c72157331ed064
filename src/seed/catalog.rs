use crate::config::CatalogConfig;
use crate::model::{
    CatalogError, FieldPath, FieldPathConstants, ObjectTypeCatalog, PropertyDefinition,
    PropertyKind, PropertySchema,
};

/// Built-in catalog used when no catalog files are configured.
pub fn default_catalog() -> (ObjectTypeCatalog, FieldPathConstants) {
    (
        ObjectTypeCatalog::new(general_schema(), drbd_schema()),
        default_constants(),
    )
}

/// Load the catalogs named in `config`. Each file that is not configured
/// falls back to its built-in counterpart.
pub fn load_catalog(
    config: &CatalogConfig,
) -> Result<(ObjectTypeCatalog, FieldPathConstants), CatalogError> {
    let (mut catalog, mut constants) = default_catalog();

    if let Some(path) = &config.general_path {
        catalog.general = PropertySchema::from_path(path)?;
        log::info!("Loaded general property catalog from {}", path.display());
    }
    if let Some(path) = &config.drbd_path {
        catalog.drbd = PropertySchema::from_path(path)?;
        log::info!("Loaded DRBD property catalog from {}", path.display());
    }
    if let Some(path) = &config.constants_path {
        constants = FieldPathConstants::from_path(path)?;
        log::info!("Loaded field path constants from {}", path.display());
    }

    Ok((catalog, constants))
}

pub fn default_constants() -> FieldPathConstants {
    [
        ("NAMESPC_AUXILIARY", "Aux"),
        ("NAMESPC_DRBD_OPTIONS", "DrbdOptions"),
        ("NAMESPC_DRBD_NET_OPTIONS", "DrbdOptions/Net"),
        ("NAMESPC_DRBD_DISK_OPTIONS", "DrbdOptions/Disk"),
        ("NAMESPC_DRBD_RESOURCE_OPTIONS", "DrbdOptions/Resource"),
        ("NAMESPC_DRBD_HANDLER_OPTIONS", "DrbdOptions/Handlers"),
        ("NAMESPC_STORAGE_DRIVER", "StorDriver"),
        ("NAMESPC_FILESYSTEM", "FileSystem"),
        ("KEY_STOR_POOL_NAME", "StorPoolName"),
        ("KEY_PREF_NIC", "PrefNic"),
        ("KEY_AUTO_QUORUM", "auto-quorum"),
        ("KEY_AUTO_ADD_QUORUM_TIEBREAKER", "auto-add-quorum-tiebreaker"),
        ("KEY_PROTOCOL", "protocol"),
        ("KEY_ALLOW_TWO_PRIMARIES", "allow-two-primaries"),
        ("KEY_MAX_BUFFERS", "max-buffers"),
        ("KEY_PING_TIMEOUT", "ping-timeout"),
        ("KEY_VERIFY_ALG", "verify-alg"),
        ("KEY_QUORUM", "quorum"),
        ("KEY_ON_NO_QUORUM", "on-no-quorum"),
        ("KEY_AUTO_PROMOTE", "auto-promote"),
        ("KEY_DISK_FLUSHES", "disk-flushes"),
        ("KEY_AL_EXTENTS", "al-extents"),
        ("KEY_C_MAX_RATE", "c-max-rate"),
        ("KEY_SPLIT_BRAIN", "split-brain"),
        ("KEY_FS_TYPE", "Type"),
        ("KEY_FS_MKFS_PARAMS", "MkfsParams"),
        ("KEY_LVM_VOLUME_GROUP", "LvmVg"),
        ("KEY_THIN_POOL", "ThinPool"),
    ]
    .into_iter()
    .collect()
}

fn path(segments: &[&str]) -> FieldPath {
    FieldPath::Composite(segments.iter().map(|s| s.to_string()).collect())
}

fn symbols(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn range(min: i64, max: i64, default: Option<i64>) -> PropertyKind {
    PropertyKind::Range {
        min: Some(min),
        max: Some(max),
        default,
    }
}

fn general_schema() -> PropertySchema {
    let mut schema = PropertySchema::default();
    schema
        .define(
            "PrefNic",
            PropertyDefinition::new(path(&["KEY_PREF_NIC"]), PropertyKind::String)
                .with_info("Preferred network interface for DRBD traffic"),
        )
        .define(
            "AutoplaceTarget",
            PropertyDefinition::new("AutoplaceTarget", PropertyKind::BooleanTrueFalse)
                .with_info("Whether the autoplacer may place resources on this node"),
        )
        .define(
            "AutoEvictAllowEviction",
            PropertyDefinition::new("DrbdOptions/AutoEvictAllowEviction", PropertyKind::BooleanTrueFalse)
                .with_info("Allow automatic eviction of this node when it stays offline"),
        )
        .define(
            "StorPoolName",
            PropertyDefinition::new(
                path(&["KEY_STOR_POOL_NAME"]),
                PropertyKind::Regex {
                    pattern: "^[A-Za-z0-9_][A-Za-z0-9_-]{1,47}$".to_string(),
                    invalid_message: Some(
                        "Storage pool names are 2-48 letters, digits, '_' or '-'".to_string(),
                    ),
                },
            )
            .with_info("Default storage pool for new resources"),
        )
        .define(
            "TcpPortAutoRange",
            PropertyDefinition::new(
                "TcpPortAutoRange",
                PropertyKind::Regex {
                    pattern: r"^\d+-\d+$".to_string(),
                    invalid_message: Some("Expected a port range such as 7000-7999".to_string()),
                },
            )
            .with_info("TCP port range for automatically allocated DRBD ports"),
        )
        .define(
            "MinorNrAutoRange",
            PropertyDefinition::new(
                "MinorNrAutoRange",
                PropertyKind::Regex {
                    pattern: r"^\d+-\d+$".to_string(),
                    invalid_message: Some("Expected a minor number range such as 1000-49999".to_string()),
                },
            )
            .with_info("Minor number range for automatically allocated DRBD devices"),
        )
        .define(
            "SearchDomain",
            PropertyDefinition::new("SearchDomain", PropertyKind::String)
                .with_info("DNS search domain appended to node names"),
        )
        .define(
            "BalanceResourcesInterval",
            PropertyDefinition::new("BalanceResourcesInterval", range(60, 86400, Some(3600)))
                .with_info("Seconds between resource balancing runs"),
        )
        .define(
            "PeerSlotsNewResource",
            PropertyDefinition::new("PeerSlotsNewResource", range(1, 31, Some(7)))
                .with_info("DRBD peer slots reserved for new resources"),
        )
        .define(
            "MaxOversubscriptionRatio",
            PropertyDefinition::new(
                "MaxOversubscriptionRatio",
                PropertyKind::Regex {
                    pattern: r"^\d+(\.\d+)?$".to_string(),
                    invalid_message: Some("Expected a decimal number".to_string()),
                },
            )
            .with_info("Upper bound for thin provisioning oversubscription"),
        )
        .define(
            "LvmVolumeGroup",
            PropertyDefinition::new(
                path(&["NAMESPC_STORAGE_DRIVER", "KEY_LVM_VOLUME_GROUP"]),
                PropertyKind::String,
            )
            .with_info("LVM volume group backing the pool"),
        )
        .define(
            "ThinPool",
            PropertyDefinition::new(path(&["NAMESPC_STORAGE_DRIVER", "KEY_THIN_POOL"]), PropertyKind::String)
                .with_info("LVM thin pool backing the pool"),
        )
        .define(
            "FileSystemType",
            PropertyDefinition::new(
                path(&["NAMESPC_FILESYSTEM", "KEY_FS_TYPE"]),
                PropertyKind::Enum {
                    values: symbols(&["ext4", "xfs"]),
                },
            )
            .with_info("File system created on new volumes"),
        )
        .define(
            "MkfsParams",
            PropertyDefinition::new(path(&["NAMESPC_FILESYSTEM", "KEY_FS_MKFS_PARAMS"]), PropertyKind::String)
                .with_info("Extra arguments passed to mkfs"),
        )
        .define(
            "MaxVolumeSize",
            PropertyDefinition::new("MaxVolumeSize", PropertyKind::LongInteger)
                .with_info("Largest volume size in KiB the group may create"),
        );

    schema
        .attach(
            "controller",
            [
                "TcpPortAutoRange",
                "MinorNrAutoRange",
                "SearchDomain",
                "BalanceResourcesInterval",
                "MaxOversubscriptionRatio",
            ],
        )
        .attach(
            "node",
            ["PrefNic", "AutoplaceTarget", "AutoEvictAllowEviction", "StorPoolName"],
        )
        .attach(
            "storagepool",
            ["PrefNic", "MaxOversubscriptionRatio", "LvmVolumeGroup", "ThinPool"],
        )
        .attach(
            "resource-definition",
            ["StorPoolName", "PeerSlotsNewResource", "FileSystemType", "MkfsParams"],
        )
        .attach("resource", ["StorPoolName", "PrefNic"])
        .attach("volume-definition", ["FileSystemType", "MkfsParams"])
        .attach(
            "resource-group",
            ["StorPoolName", "PeerSlotsNewResource", "FileSystemType", "MaxVolumeSize"],
        );

    schema
}

fn drbd_schema() -> PropertySchema {
    let mut schema = PropertySchema::default();
    schema
        .define(
            "AutoQuorum",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_OPTIONS", "KEY_AUTO_QUORUM"]),
                PropertyKind::Enum {
                    values: symbols(&["io-error", "suspend-io", "disabled"]),
                },
            )
            .with_info("Quorum policy applied automatically to resources"),
        )
        .define(
            "AutoAddQuorumTiebreaker",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_OPTIONS", "KEY_AUTO_ADD_QUORUM_TIEBREAKER"]),
                PropertyKind::BooleanTrueFalse,
            )
            .with_info("Add a diskless tiebreaker when it restores quorum"),
        )
        .define(
            "Protocol",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_NET_OPTIONS", "KEY_PROTOCOL"]),
                PropertyKind::Enum {
                    values: symbols(&["A", "B", "C"]),
                },
            )
            .with_info("Replication protocol"),
        )
        .define(
            "AllowTwoPrimaries",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_NET_OPTIONS", "KEY_ALLOW_TWO_PRIMARIES"]),
                PropertyKind::Boolean,
            )
            .with_info("Allow both peers to be primary at the same time"),
        )
        .define(
            "MaxBuffers",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_NET_OPTIONS", "KEY_MAX_BUFFERS"]),
                range(32, 131072, Some(2048)),
            )
            .with_info("Receive buffers per connection"),
        )
        .define(
            "PingTimeout",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_NET_OPTIONS", "KEY_PING_TIMEOUT"]),
                range(1, 300, Some(5)),
            )
            .with_info("Ping timeout in tenths of a second"),
        )
        .define(
            "VerifyAlg",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_NET_OPTIONS", "KEY_VERIFY_ALG"]),
                PropertyKind::EnumCreatable {
                    values: symbols(&["crc32c", "sha1", "md5"]),
                },
            )
            .with_info("Digest algorithm used for online verify"),
        )
        .define(
            "Quorum",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_RESOURCE_OPTIONS", "KEY_QUORUM"]),
                PropertyKind::EnumCreatable {
                    values: symbols(&["off", "majority", "all"]),
                },
            )
            .with_info("Number of nodes required for quorum, or a policy name"),
        )
        .define(
            "OnNoQuorum",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_RESOURCE_OPTIONS", "KEY_ON_NO_QUORUM"]),
                PropertyKind::Enum {
                    values: symbols(&["io-error", "suspend-io"]),
                },
            )
            .with_info("Behavior when quorum is lost"),
        )
        .define(
            "AutoPromote",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_RESOURCE_OPTIONS", "KEY_AUTO_PROMOTE"]),
                PropertyKind::Boolean,
            )
            .with_info("Promote on open for write"),
        )
        .define(
            "DiskFlushes",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_DISK_OPTIONS", "KEY_DISK_FLUSHES"]),
                PropertyKind::Boolean,
            )
            .with_info("Use disk flushes between dependent writes"),
        )
        .define(
            "AlExtents",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_DISK_OPTIONS", "KEY_AL_EXTENTS"]),
                range(67, 65534, Some(1237)),
            )
            .with_info("Activity log size in extents"),
        )
        .define(
            "CMaxRate",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_DISK_OPTIONS", "KEY_C_MAX_RATE"]),
                PropertyKind::LongInteger,
            )
            .with_info("Upper resync rate limit in KiB/s"),
        )
        .define(
            "SplitBrainHandler",
            PropertyDefinition::new(
                path(&["NAMESPC_DRBD_HANDLER_OPTIONS", "KEY_SPLIT_BRAIN"]),
                PropertyKind::String,
            )
            .with_info("Command run when split brain is detected"),
        );

    let connection = ["Protocol", "AllowTwoPrimaries", "MaxBuffers", "PingTimeout", "VerifyAlg"];
    let resource = ["Quorum", "OnNoQuorum", "AutoPromote"];
    let disk = ["DiskFlushes", "AlExtents", "CMaxRate"];

    schema
        .attach("controller", ["AutoQuorum", "AutoAddQuorumTiebreaker"])
        .attach("controller", connection)
        .attach("controller", resource)
        .attach("controller", disk)
        .attach("controller", ["SplitBrainHandler"])
        .attach("node", connection)
        .attach("node", disk)
        .attach("resource-definition", connection)
        .attach("resource-definition", resource)
        .attach("resource-definition", disk)
        .attach("resource-definition", ["SplitBrainHandler"])
        .attach("resource", disk)
        .attach("volume-definition", disk)
        .attach("resource-group", connection)
        .attach("resource-group", resource)
        .attach("resource-group", disk);

    schema
}
