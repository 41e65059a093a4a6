//! The JVM does not rely on runtime layout of classes, interfaces or instances.
//! Instead, instructions refer to symbolic information provided by the `constant_pool` table.
//!
//! Specification for the [constant pool] in a classfile.
//!
//! [constant pool]: https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4

use bumpalo::{Bump, collections::Vec};
use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::classfile::ClassfileError;
use crate::classfile::reader::{Reader, alloc_str};

/// Constant pool of a given Java class.
///
/// Slot 0 is reserved and always `None`; the slot after a `Long` or `Double`
/// is `None` as well, because 8-byte constants occupy two slots.
#[derive(Debug, PartialEq, Clone)]
pub struct ConstantPool<'c> {
    entries: Vec<'c, Option<ConstantPoolEntry<'c>>>,
}

/// A given entry in the constant pool.
///
/// It's defined by the [specification] by having a `tag` and `info`.
///
/// [specification]: https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4
#[derive(Debug, PartialEq, Clone, Copy)]
#[repr(u8)]
pub enum ConstantPoolEntry<'c> {
    Utf8(&'c str) = 1,
    Integer(i32) = 3,
    Float(f32) = 4,
    Long(i64) = 5,
    Double(f64) = 6,

    Class(u16) = 7,
    StringRef(u16) = 8,

    FieldRef(u16, u16) = 9,
    MethodRef(u16, u16) = 10,
    InterfaceMethodRef(u16, u16) = 11,
    NameAndType(u16, u16) = 12,

    MethodHandle(u8, u16) = 15,
    MethodType(u16) = 16,
    Dynamic(u16, u16) = 17,
    InvokeDynamic(u16, u16) = 18,
    Module(u16) = 19,
    Package(u16) = 20,
}

/// The byte that selects a [`ConstantPoolEntry`] variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConstantPoolError {
    #[error("Invalid index location: {0}")]
    InvalidIndex(u16),
    #[error("Accessed reserved slot: {0}")]
    UnusableSlot(u16),
    #[error("Expected {expected} on this index, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
}

impl<'c> ConstantPool<'c> {
    pub(super) fn parse<'b>(
        reader: &mut Reader<'b>,
        arena: &'c Bump,
    ) -> Result<Self, ClassfileError>
    where
        'b: 'c,
    {
        let count = reader.read::<u16>()? as usize;
        let mut pool = ConstantPool::with_capacity(count, arena);

        let mut idx = 1;
        while idx < count {
            let offset = reader.offset();
            let raw = reader.read::<u8>()?;
            let tag = ConstantTag::try_from(raw)
                .map_err(|_| ClassfileError::UnknownConstantTag { tag: raw, offset })?;

            let entry = match tag {
                ConstantTag::Utf8 => {
                    ConstantPoolEntry::Utf8(alloc_str(reader.read_utf8()?, arena))
                }
                ConstantTag::Integer => ConstantPoolEntry::Integer(reader.read::<i32>()?),
                ConstantTag::Float => ConstantPoolEntry::Float(reader.read::<f32>()?),
                ConstantTag::Long => ConstantPoolEntry::Long(reader.read::<i64>()?),
                ConstantTag::Double => ConstantPoolEntry::Double(reader.read::<f64>()?),
                ConstantTag::Class => ConstantPoolEntry::Class(reader.read()?),
                ConstantTag::String => ConstantPoolEntry::StringRef(reader.read()?),
                ConstantTag::Fieldref
                | ConstantTag::Methodref
                | ConstantTag::InterfaceMethodref
                | ConstantTag::Dynamic
                | ConstantTag::InvokeDynamic => {
                    let class_index: u16 = reader.read()?;
                    let name_and_type_index: u16 = reader.read()?;
                    match tag {
                        ConstantTag::Fieldref => {
                            ConstantPoolEntry::FieldRef(class_index, name_and_type_index)
                        }
                        ConstantTag::Methodref => {
                            ConstantPoolEntry::MethodRef(class_index, name_and_type_index)
                        }
                        ConstantTag::InterfaceMethodref => {
                            ConstantPoolEntry::InterfaceMethodRef(class_index, name_and_type_index)
                        }
                        ConstantTag::Dynamic => {
                            ConstantPoolEntry::Dynamic(class_index, name_and_type_index)
                        }
                        _ => ConstantPoolEntry::InvokeDynamic(class_index, name_and_type_index),
                    }
                }
                ConstantTag::NameAndType => {
                    ConstantPoolEntry::NameAndType(reader.read()?, reader.read()?)
                }
                ConstantTag::MethodHandle => {
                    ConstantPoolEntry::MethodHandle(reader.read()?, reader.read()?)
                }
                ConstantTag::MethodType => ConstantPoolEntry::MethodType(reader.read()?),
                ConstantTag::Module => ConstantPoolEntry::Module(reader.read()?),
                ConstantTag::Package => ConstantPoolEntry::Package(reader.read()?),
            };

            idx += if entry.uses_two_slots() { 2 } else { 1 };
            pool.push(entry);
        }

        Ok(pool)
    }

    fn with_capacity(capacity: usize, arena: &'c Bump) -> Self {
        let mut entries = Vec::with_capacity_in(capacity, arena);
        entries.push(None); // slot 0 is reserved
        ConstantPool { entries }
    }

    fn push(&mut self, entry: ConstantPoolEntry<'c>) {
        self.entries.push(Some(entry));

        if entry.uses_two_slots() {
            self.entries.push(None);
        }
    }

    /// Number of slots, counting the reserved slot 0 and the phantom slots
    /// after 8-byte constants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Every slot in order, reserved and phantom slots included.
    pub fn slots(&self) -> &[Option<ConstantPoolEntry<'c>>] {
        &self.entries
    }

    /// Tries to access a [pool entry](ConstantPoolEntry) at a given index.
    ///
    /// **Note**: it uses 1-based indices.
    pub fn get(&self, index: u16) -> Result<&ConstantPoolEntry<'c>, ConstantPoolError> {
        self.get_with(index, Ok)
    }

    pub fn get_with<'s, F, T>(
        &'s self,
        index: u16,
        check_and_convert: F,
    ) -> Result<T, ConstantPoolError>
    where
        F: FnOnce(&'s ConstantPoolEntry<'c>) -> Result<T, ConstantPoolError>,
    {
        if index == 0 {
            return Err(ConstantPoolError::InvalidIndex(index));
        }

        match self.entries.get(index as usize) {
            Some(Some(entry)) => check_and_convert(entry),
            Some(None) => Err(ConstantPoolError::UnusableSlot(index)),
            None => Err(ConstantPoolError::InvalidIndex(index)),
        }
    }

    /// Typed lookup of a `CONSTANT_Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&'c str, ConstantPoolError> {
        self.get_with(index, |entry| match entry {
            ConstantPoolEntry::Utf8(value) => Ok(*value),
            other => Err(ConstantPoolError::WrongKind {
                expected: "CONSTANT_Utf8",
                found: other.tag_name(),
            }),
        })
    }

    /// Resolves a `CONSTANT_Class` entry down to its name.
    pub fn class_name(&self, index: u16) -> Result<&'c str, ConstantPoolError> {
        let name_index = self.get_with(index, |entry| match entry {
            ConstantPoolEntry::Class(name_index) => Ok(*name_index),
            other => Err(ConstantPoolError::WrongKind {
                expected: "CONSTANT_Class",
                found: other.tag_name(),
            }),
        })?;

        self.utf8(name_index)
    }
}

impl<'c> ConstantPoolEntry<'c> {
    /// JVM mandates that `Long` and `Double` constants must occupy two slots
    /// in the constant pool.
    fn uses_two_slots(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }

    /// The `CONSTANT_<Name>` spelling the specification uses for this variant.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "CONSTANT_Utf8",
            Self::Integer(_) => "CONSTANT_Integer",
            Self::Float(_) => "CONSTANT_Float",
            Self::Long(_) => "CONSTANT_Long",
            Self::Double(_) => "CONSTANT_Double",
            Self::Class(_) => "CONSTANT_Class",
            Self::StringRef(_) => "CONSTANT_String",
            Self::FieldRef(..) => "CONSTANT_Fieldref",
            Self::MethodRef(..) => "CONSTANT_Methodref",
            Self::InterfaceMethodRef(..) => "CONSTANT_InterfaceMethodref",
            Self::NameAndType(..) => "CONSTANT_NameAndType",
            Self::MethodHandle(..) => "CONSTANT_MethodHandle",
            Self::MethodType(_) => "CONSTANT_MethodType",
            Self::Dynamic(..) => "CONSTANT_Dynamic",
            Self::InvokeDynamic(..) => "CONSTANT_InvokeDynamic",
            Self::Module(_) => "CONSTANT_Module",
            Self::Package(_) => "CONSTANT_Package",
        }
    }
}
