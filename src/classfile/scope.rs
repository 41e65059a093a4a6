//! Read-only typed views over a parsed class file.
//!
//! Nothing here owns data: every accessor takes the constant pool it needs
//! and projects indices into the entries behind them, failing with
//! [`ConstantPoolError::WrongKind`] when the referent has the wrong tag.

use crate::classfile::attributes::Attribute;
use crate::classfile::constant_pool::{ConstantPool, ConstantPoolEntry, ConstantPoolError};
use crate::classfile::fields::{Field, Method};

/// The payload behind a field's `ConstantValue` attribute, with `String`
/// constants resolved down to their text.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConstantValue<'c> {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(&'c str),
}

impl<'c> ConstantPool<'c> {
    /// Resolves a `CONSTANT_NameAndType` entry into its `(name, descriptor)`
    /// pair.
    pub fn name_and_type(&self, index: u16) -> Result<(&'c str, &'c str), ConstantPoolError> {
        let (name_index, descriptor_index) = self.get_with(index, |entry| match entry {
            ConstantPoolEntry::NameAndType(name_index, descriptor_index) => {
                Ok((*name_index, *descriptor_index))
            }
            other => Err(ConstantPoolError::WrongKind {
                expected: "CONSTANT_NameAndType",
                found: other.tag_name(),
            }),
        })?;

        Ok((self.utf8(name_index)?, self.utf8(descriptor_index)?))
    }
}

impl<'c> ConstantPoolEntry<'c> {
    /// Name of the class a ref-style entry belongs to.
    pub fn class_info(&self, pool: &ConstantPool<'c>) -> Result<&'c str, ConstantPoolError> {
        match self {
            Self::FieldRef(class_index, _)
            | Self::MethodRef(class_index, _)
            | Self::InterfaceMethodRef(class_index, _) => pool.class_name(*class_index),
            other => Err(ConstantPoolError::WrongKind {
                expected: "CONSTANT_Fieldref, CONSTANT_Methodref or CONSTANT_InterfaceMethodref",
                found: other.tag_name(),
            }),
        }
    }

    /// `(name, descriptor)` pair of a ref-style or dynamic entry.
    pub fn name_and_type(&self, pool: &ConstantPool<'c>) -> Result<(&'c str, &'c str), ConstantPoolError> {
        match self {
            Self::FieldRef(_, name_and_type_index)
            | Self::MethodRef(_, name_and_type_index)
            | Self::InterfaceMethodRef(_, name_and_type_index)
            | Self::Dynamic(_, name_and_type_index)
            | Self::InvokeDynamic(_, name_and_type_index) => {
                pool.name_and_type(*name_and_type_index)
            }
            other => Err(ConstantPoolError::WrongKind {
                expected: "a ref-style constant",
                found: other.tag_name(),
            }),
        }
    }
}

impl<'c> Field<'c> {
    pub fn name(&self, pool: &ConstantPool<'c>) -> Result<&'c str, ConstantPoolError> {
        pool.utf8(self.name_index)
    }

    pub fn descriptor(&self, pool: &ConstantPool<'c>) -> Result<&'c str, ConstantPoolError> {
        pool.utf8(self.descriptor_index)
    }

    /// The field's `ConstantValue` payload, if it carries that attribute.
    pub fn constant_value(
        &self,
        pool: &ConstantPool<'c>,
    ) -> Result<Option<ConstantValue<'c>>, ConstantPoolError> {
        let index = self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::ConstantValue {
                constantvalue_index,
                ..
            } => Some(*constantvalue_index),
            _ => None,
        });

        let Some(index) = index else {
            return Ok(None);
        };

        pool.get_with(index, |entry| match entry {
            ConstantPoolEntry::Integer(value) => Ok(ConstantValue::Integer(*value)),
            ConstantPoolEntry::Float(value) => Ok(ConstantValue::Float(*value)),
            ConstantPoolEntry::Long(value) => Ok(ConstantValue::Long(*value)),
            ConstantPoolEntry::Double(value) => Ok(ConstantValue::Double(*value)),
            ConstantPoolEntry::StringRef(string_index) => {
                pool.utf8(*string_index).map(ConstantValue::String)
            }
            other => Err(ConstantPoolError::WrongKind {
                expected: "a loadable constant",
                found: other.tag_name(),
            }),
        })
        .map(Some)
    }
}

impl<'c> Method<'c> {
    pub fn name(&self, pool: &ConstantPool<'c>) -> Result<&'c str, ConstantPoolError> {
        pool.utf8(self.name_index)
    }

    pub fn descriptor(&self, pool: &ConstantPool<'c>) -> Result<&'c str, ConstantPoolError> {
        pool.utf8(self.descriptor_index)
    }

    pub fn is_constructor(&self, pool: &ConstantPool<'c>) -> bool {
        matches!(self.name(pool), Ok("<init>"))
    }

    pub fn is_static_initializer(&self, pool: &ConstantPool<'c>) -> bool {
        matches!(self.name(pool), Ok("<clinit>"))
    }

    /// The method's first `Code` attribute, absent on abstract and native
    /// methods.
    pub fn code(&self) -> Option<&'c Attribute<'c>> {
        self.attributes
            .iter()
            .find(|attribute| matches!(attribute, Attribute::Code { .. }))
    }
}
