//! This module is responsible for parsing and representing `.class` files as defined by the Java Virtual Machine specification.
//!
//! Which include things like:
//! - Low-level binary parsing of `.class` files, including constant pool, fields, methods, and attributes.
//! - Data structures to represent class file components in memory.
//! - Typed lookups from any index field into the constant pool entry behind it.
//!
//! The output of this module is a structured [`Classfile`] representation, which the
//! JSON renderer in [`crate::json`] walks to inline every constant-pool reference.
//!
//! Parsing is a single forward pass: raw bytes in, immutable arena-allocated tree out.
//! Nothing is validated beyond what the grammar itself demands; out-of-range indices
//! are kept as-is and surface when something tries to resolve them.

pub mod attributes;
pub mod constant_pool;
pub mod fields;
pub(crate) mod reader;
pub mod scope;

use self::attributes::{Attribute, get_attributes};
use self::constant_pool::{ConstantPool, ConstantPoolError};
use self::fields::{Field, Method};
use self::reader::Reader;
use bitflags::bitflags;
use bumpalo::{Bump, collections::Vec};
use thiserror::Error;
use tracing::debug;

/// Classfile structure defined by JVMS (4.1)
#[derive(Debug, PartialEq, Clone)]
pub struct Classfile<'c> {
    pub magic: u32,
    pub version: Version,
    pub constant_pool: ConstantPool<'c>,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: &'c [u16],
    pub fields: &'c [Field<'c>],
    pub methods: &'c [Method<'c>],
    pub attributes: &'c [Attribute<'c>],
}

/// This determines the version of the `class` file format.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Version {
    pub(crate) major: u16,
    pub(crate) minor: u16,
}

#[derive(Error, Debug)]
pub enum ClassfileError {
    #[error("Invalid classfile: magic number 0x{0:08X} doesn't match.")]
    BadMagic(u32),
    #[error("Unexpected end of classfile at offset {0}.")]
    Truncated(usize),
    #[error("Unknown constant pool tag {tag} at offset {offset}.")]
    UnknownConstantTag { tag: u8, offset: usize },
    #[error("Unknown stack map frame type: {0}")]
    UnknownFrameType(u8),
    #[error("Unknown verification type tag: {0}")]
    UnknownVerificationTag(u8),
    #[error("Unknown element value tag: {0:#04x}")]
    UnknownElementValueTag(u8),
    #[error("Unknown type annotation target: {0:#04x}")]
    UnknownTypeAnnotationTarget(u8),
    #[error("Attribute name is not utf8 on index: {0}")]
    InvalidAttributeNameIndex(u16),
    #[error("Invalid modified UTF-8 at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        source: cesu8::Cesu8DecodingError,
    },
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Magic header number for a `.class` file.
pub(crate) const MAGIC: u32 = 0xCAFEBABE;

bitflags! {
    /// Class access and property flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared final; no subclasses allowed.
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by the invokespecial instruction.
        const SUPER = 0x0020;
        /// Is an interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated.
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an enum class.
        const ENUM = 0x4000;
        /// Is a module, not a class or interface.
        const MODULE = 0x8000;
    }
}

impl<'c> Classfile<'c> {
    /// Parses a classfile out of `buff`, allocating the tree in `arena`.
    ///
    /// The buffer must stay alive as long as the arena: string and bytecode
    /// slices borrow straight from it. Trailing bytes after the class
    /// attribute table are not inspected.
    pub fn new<'b>(buff: &'b [u8], arena: &'c Bump) -> Result<Self, ClassfileError>
    where
        'b: 'c,
    {
        let mut reader = Reader::new(buff);

        let magic = reader.read::<u32>()?;
        if magic != MAGIC {
            return Err(ClassfileError::BadMagic(magic));
        }

        let minor = reader.read::<u16>()?;
        let major = reader.read::<u16>()?;
        let version = Version::new(major, minor);

        let constant_pool = ConstantPool::parse(&mut reader, arena)?;
        debug!("parsed constant pool with {} slots", constant_pool.len());

        let access_flags = AccessFlags::from_bits_retain(reader.read::<u16>()?);
        let this_class: u16 = reader.read()?;
        let super_class: u16 = reader.read()?;

        let interfaces_count = reader.read::<u16>()? as usize;
        let mut interfaces = Vec::with_capacity_in(interfaces_count, arena);
        for _ in 0..interfaces_count {
            interfaces.push(reader.read::<u16>()?);
        }
        let interfaces: &'c [u16] = interfaces.into_bump_slice();

        let fields_count = reader.read::<u16>()? as usize;
        let mut fields = Vec::with_capacity_in(fields_count, arena);
        for _ in 0..fields_count {
            fields.push(Field::parse(&mut reader, &constant_pool, arena)?);
        }
        let fields: &'c [Field<'c>] = fields.into_bump_slice();

        let methods_count = reader.read::<u16>()? as usize;
        let mut methods = Vec::with_capacity_in(methods_count, arena);
        for _ in 0..methods_count {
            methods.push(Method::parse(&mut reader, &constant_pool, arena)?);
        }
        let methods: &'c [Method<'c>] = methods.into_bump_slice();

        let attributes = get_attributes(&mut reader, &constant_pool, arena)?;
        debug!(
            "parsed {} fields, {} methods and {} class attributes",
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(Classfile {
            magic,
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(AccessFlags::PUBLIC)
    }
    pub fn is_final(&self) -> bool {
        self.access_flags.contains(AccessFlags::FINAL)
    }
    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(AccessFlags::ABSTRACT)
    }

    pub fn version(&self) -> (u16, u16) {
        (self.version.major, self.version.minor)
    }

    pub fn class_name(&self) -> Option<&'c str> {
        self.constant_pool.class_name(self.this_class).ok()
    }

    /// Name of the direct superclass; `None` for `java/lang/Object`, the one
    /// class allowed a zero `super_class` index.
    pub fn super_class_name(&self) -> Option<&'c str> {
        if self.super_class == 0 {
            return None;
        }

        self.constant_pool.class_name(self.super_class).ok()
    }

    pub fn interface_names(
        &self,
        arena: &'c Bump,
    ) -> Result<Vec<'c, &'c str>, ConstantPoolError> {
        let mut names = Vec::new_in(arena);
        for index in self.interfaces {
            names.push(self.constant_pool.class_name(*index)?);
        }

        Ok(names)
    }

    /// Value of the class-level `SourceFile` attribute, if present.
    pub fn source_file(&self) -> Option<&'c str> {
        self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::SourceFile {
                sourcefile_index, ..
            } => self.constant_pool.utf8(*sourcefile_index).ok(),
            _ => None,
        })
    }
}

impl Version {
    const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}
