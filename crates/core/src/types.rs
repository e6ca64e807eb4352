//! Core identifier types
//!
//! This module defines the foundational types:
//! - Id: bit-packed object identifier (type tag + sequence number)
//! - TypeId: discriminator for identifier types
//! - BuiltinType: the fixed set of types seeded at registry construction
//!
//! ## Identifier Encoding
//!
//! An `Id` is a signed 64-bit integer. Negative values are never valid;
//! `Id::INVALID` (-1) is the reserved sentinel. The layout is:
//!
//! ```text
//! bit  63      : always 0 (valid ids are non-negative)
//! bits 56..=62 : 7-bit type tag
//! bits  0..=55 : 56-bit per-type sequence number
//! ```
//!
//! Because the tag is carried in the identifier itself, recovering the type
//! of an id is a pure bit operation with no table lookup (`Id::type_of`).
//! Validated lookups live in the registry crate.

use std::fmt;

/// Number of bits used for the type tag.
pub const TYPE_BITS: u32 = 7;

/// Number of bits used for the per-type sequence number.
pub const SEQ_BITS: u32 = 56;

/// Maximum number of type tags (tag 0 is reserved as invalid).
pub const MAX_TYPES: u32 = 1 << TYPE_BITS;

/// Largest sequence number that fits in the identifier layout.
pub const MAX_SEQ: u64 = (1u64 << SEQ_BITS) - 1;

/// Number of reserved type tags: tag 0 (invalid) plus the builtin types.
///
/// User-registered types are allocated from `NTYPES` upward.
pub const NTYPES: u32 = 8;

/// Discriminator for an identifier type
///
/// A TypeId is either one of the builtin tags (see [`BuiltinType`]) or a
/// value >= [`NTYPES`] allocated when a user type is registered. Tag 0 is
/// reserved and never names a live type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a TypeId from its raw tag value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw tag value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// True iff this tag names one of the builtin types
    pub const fn is_builtin(&self) -> bool {
        self.0 >= 1 && self.0 < NTYPES
    }

    /// True iff this tag is in the user-allocated range
    pub const fn is_user(&self) -> bool {
        self.0 >= NTYPES && self.0 < MAX_TYPES
    }

    /// True iff this tag can name a type at all (builtin or user range)
    pub const fn is_encodable(&self) -> bool {
        self.0 >= 1 && self.0 < MAX_TYPES
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match BuiltinType::from_type_id(*self) {
            Some(builtin) => write!(f, "{}", builtin.name()),
            None => write!(f, "type#{}", self.0),
        }
    }
}

/// The builtin identifier types seeded at registry construction
///
/// ## Tag Values
///
/// These values are part of the identifier encoding and MUST NOT change:
/// - File = 1
/// - Group = 2
/// - Datatype = 3
/// - Dataspace = 4
/// - Dataset = 5
/// - Attr = 6
/// - VolConnector = 7
///
/// Tag 0 is reserved as the invalid tag. Builtin types exist for the whole
/// registry lifetime and can never be destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BuiltinType {
    /// Open file handles
    File = 1,
    /// Group objects
    Group = 2,
    /// Named datatypes
    Datatype = 3,
    /// Dataspace descriptions
    Dataspace = 4,
    /// Dataset objects
    Dataset = 5,
    /// Attribute objects
    Attr = 6,
    /// Virtual-object-layer connectors
    VolConnector = 7,
}

impl BuiltinType {
    /// All builtin types, in tag order
    pub const ALL: [BuiltinType; 7] = [
        BuiltinType::File,
        BuiltinType::Group,
        BuiltinType::Datatype,
        BuiltinType::Dataspace,
        BuiltinType::Dataset,
        BuiltinType::Attr,
        BuiltinType::VolConnector,
    ];

    /// Convert to the equivalent TypeId
    pub const fn as_type_id(&self) -> TypeId {
        TypeId(*self as u32)
    }

    /// Try to map a TypeId back to a builtin type
    pub const fn from_type_id(ty: TypeId) -> Option<Self> {
        match ty.0 {
            1 => Some(BuiltinType::File),
            2 => Some(BuiltinType::Group),
            3 => Some(BuiltinType::Datatype),
            4 => Some(BuiltinType::Dataspace),
            5 => Some(BuiltinType::Dataset),
            6 => Some(BuiltinType::Attr),
            7 => Some(BuiltinType::VolConnector),
            _ => None,
        }
    }

    /// Human-readable name of this builtin type
    pub const fn name(&self) -> &'static str {
        match self {
            BuiltinType::File => "file",
            BuiltinType::Group => "group",
            BuiltinType::Datatype => "datatype",
            BuiltinType::Dataspace => "dataspace",
            BuiltinType::Dataset => "dataset",
            BuiltinType::Attr => "attr",
            BuiltinType::VolConnector => "vol-connector",
        }
    }
}

impl From<BuiltinType> for TypeId {
    fn from(builtin: BuiltinType) -> Self {
        builtin.as_type_id()
    }
}

/// Bit-packed object identifier
///
/// Callers treat an Id as an opaque non-negative integer. Internally the
/// top bits carry the owning type's tag and the low bits a per-type
/// sequence number (see the module docs for the exact layout), which makes
/// type recovery O(1) without a table lookup.
///
/// `Id::type_of` is a *pure decode*: it tells you what type the encoding
/// claims, not whether the id is currently live. Liveness validation is the
/// registry's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(i64);

impl Id {
    /// The reserved "invalid identifier" sentinel
    pub const INVALID: Id = Id(-1);

    /// Encode a (type tag, sequence) pair into an identifier
    ///
    /// Returns None if the tag is outside the encodable range or the
    /// sequence number does not fit in [`SEQ_BITS`] bits.
    pub fn encode(ty: TypeId, seq: u64) -> Option<Self> {
        if !ty.is_encodable() || seq > MAX_SEQ {
            return None;
        }
        Some(Id(((ty.raw() as i64) << SEQ_BITS) | seq as i64))
    }

    /// Decode the type tag carried by this identifier (pure decode)
    ///
    /// Does not consult any table: an id that was never issued, or whose
    /// entry has been removed, still decodes to *some* tag.
    pub const fn type_of(&self) -> TypeId {
        TypeId(((self.0 >> SEQ_BITS) & (MAX_TYPES as i64 - 1)) as u32)
    }

    /// Decode the sequence number carried by this identifier
    pub const fn seq(&self) -> u64 {
        (self.0 & MAX_SEQ as i64) as u64
    }

    /// Raw i64 value of this identifier
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Construct from a raw i64 value (no validation beyond the bit layout)
    pub const fn from_raw(raw: i64) -> Self {
        Id(raw)
    }

    /// True iff the bit pattern could name a live handle
    ///
    /// Negative values (including [`Id::INVALID`]) and values whose tag is
    /// the reserved 0 tag are never valid.
    pub const fn is_plausible(&self) -> bool {
        self.0 >= 0 && self.type_of().raw() != 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "<invalid>")
        } else {
            write!(f, "{}:{}", self.type_of(), self.seq())
        }
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}
