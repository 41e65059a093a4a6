//! Class member representation.
//! A `field_info` or `method_info` structure describes one member of a class:
//! its access flags, its name, its descriptor and its attribute table.

use bitflags::bitflags;
use bumpalo::Bump;

use crate::classfile::ClassfileError;
use crate::classfile::attributes::{Attribute, get_attributes};
use crate::classfile::constant_pool::ConstantPool;
use crate::classfile::reader::Reader;

/// `field_info` defined by JVMS 4.5.
#[derive(Debug, PartialEq, Clone)]
pub struct Field<'c> {
    pub access_flags: FieldFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: &'c [Attribute<'c>],
}

/// `method_info` defined by JVMS 4.6.
#[derive(Debug, PartialEq, Clone)]
pub struct Method<'c> {
    pub access_flags: MethodFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: &'c [Attribute<'c>],
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const PUBLIC    = 0x0001;
        /// Declared private; accessible only within the defining class and other classes belonging
        /// to the same nest.
        const PRIVATE   = 0x0002;
        /// Declared protected; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared static.
        const STATIC    = 0x0008;
        /// Declared final; never directly assigned to after object construction.
        const FINAL     = 0x0010;
        /// Declared volatile; cannot be cached.
        const VOLATILE  = 0x0040;
        /// Declared transient; not written or read by a persistent object manager.
        const TRANSIENT = 0x0080;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an element of an enum class.
        const ENUM      = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const PUBLIC       = 0x0001;
        /// Declared private; accessible only within the defining class.
        const PRIVATE      = 0x0002;
        /// Declared protected; may be accessed within subclasses.
        const PROTECTED    = 0x0004;
        /// Declared static.
        const STATIC       = 0x0008;
        /// Declared final; must not be overridden.
        const FINAL        = 0x0010;
        /// Declared synchronized; invocation is wrapped by a monitor use.
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler.
        const BRIDGE       = 0x0040;
        /// Declared with a variable number of arguments.
        const VARARGS      = 0x0080;
        /// Declared native; implemented in a language other than Java.
        const NATIVE       = 0x0100;
        /// Declared abstract; no implementation is provided.
        const ABSTRACT     = 0x0400;
        /// Declared strictfp; floating-point mode is FP-strict.
        const STRICT       = 0x0800;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC    = 0x1000;
    }
}

impl<'c> Field<'c> {
    pub(super) fn parse<'b>(
        reader: &mut Reader<'b>,
        pool: &ConstantPool<'c>,
        arena: &'c Bump,
    ) -> Result<Self, ClassfileError>
    where
        'b: 'c,
    {
        Ok(Field {
            access_flags: FieldFlags::from_bits_retain(reader.read()?),
            name_index: reader.read()?,
            descriptor_index: reader.read()?,
            attributes: get_attributes(reader, pool, arena)?,
        })
    }
}

impl<'c> Method<'c> {
    pub(super) fn parse<'b>(
        reader: &mut Reader<'b>,
        pool: &ConstantPool<'c>,
        arena: &'c Bump,
    ) -> Result<Self, ClassfileError>
    where
        'b: 'c,
    {
        Ok(Method {
            access_flags: MethodFlags::from_bits_retain(reader.read()?),
            name_index: reader.read()?,
            descriptor_index: reader.read()?,
            attributes: get_attributes(reader, pool, arena)?,
        })
    }
}
