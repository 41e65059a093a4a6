//! Attributes attach metadata to classes, members, record components and to
//! the `Code` attribute itself.
//!
//! Dispatch is by the attribute's name, resolved through the constant pool
//! that was built just before the first attribute table shows up. A name this
//! module doesn't know keeps its raw payload in [`Attribute::Unknown`] instead
//! of failing the parse.
//!
//! Defined by JVMS (4.7).

use bumpalo::{Bump, collections::Vec};

use crate::classfile::ClassfileError;
use crate::classfile::constant_pool::ConstantPool;
use crate::classfile::reader::{Reader, alloc_str};

/// Attributes as defined by JVMS (4.7).
///
/// Every variant keeps its `attribute_name_index`; the on-disk
/// `attribute_length` is consumed during parsing and not retained.
#[derive(Debug, PartialEq, Clone)]
pub enum Attribute<'c> {
    /// JVMS (4.7.2)
    ConstantValue {
        attribute_name_index: u16,
        constantvalue_index: u16,
    },

    /// JVMS (4.7.3)
    Code {
        attribute_name_index: u16,
        max_stack: u16,
        max_locals: u16,
        code: &'c [u8],
        exception_table: &'c [ExceptionEntry],
        attributes: &'c [Attribute<'c>],
    },

    /// JVMS (4.7.4)
    StackMapTable {
        attribute_name_index: u16,
        entries: &'c [StackMapFrame<'c>],
    },

    /// Pre-Java-6 uncompressed predecessor of `StackMapTable`. Frames are
    /// normalised to [`StackMapFrame::FullFrame`] with `offset_delta` holding
    /// the absolute bytecode offset, not a delta.
    StackMap {
        attribute_name_index: u16,
        entries: &'c [StackMapFrame<'c>],
    },

    /// JVMS (4.7.5)
    Exceptions {
        attribute_name_index: u16,
        exception_index_table: &'c [u16],
    },

    /// JVMS (4.7.6)
    InnerClasses {
        attribute_name_index: u16,
        classes: &'c [InnerClass],
    },

    /// JVMS (4.7.7)
    EnclosingMethod {
        attribute_name_index: u16,
        class_index: u16,
        method_index: u16,
    },

    /// JVMS (4.7.8)
    Synthetic { attribute_name_index: u16 },

    /// JVMS (4.7.9)
    Signature {
        attribute_name_index: u16,
        signature_index: u16,
    },

    /// JVMS (4.7.10)
    SourceFile {
        attribute_name_index: u16,
        sourcefile_index: u16,
    },

    /// JVMS (4.7.11)
    SourceDebugExtension {
        attribute_name_index: u16,
        debug_extension: &'c str,
    },

    /// JVMS (4.7.12)
    LineNumberTable {
        attribute_name_index: u16,
        entries: &'c [LineNumber],
    },

    /// JVMS (4.7.13)
    LocalVariableTable {
        attribute_name_index: u16,
        entries: &'c [LocalVariable],
    },

    /// JVMS (4.7.14)
    LocalVariableTypeTable {
        attribute_name_index: u16,
        entries: &'c [LocalVariableType],
    },

    /// JVMS (4.7.15)
    Deprecated { attribute_name_index: u16 },

    /// JVMS (4.7.16)
    RuntimeVisibleAnnotations {
        attribute_name_index: u16,
        annotations: &'c [Annotation<'c>],
    },
    RuntimeInvisibleAnnotations {
        attribute_name_index: u16,
        annotations: &'c [Annotation<'c>],
    },

    /// JVMS (4.7.18). The parameter count here is a single byte.
    RuntimeVisibleParameterAnnotations {
        attribute_name_index: u16,
        parameters: &'c [ParameterAnnotations<'c>],
    },
    RuntimeInvisibleParameterAnnotations {
        attribute_name_index: u16,
        parameters: &'c [ParameterAnnotations<'c>],
    },

    /// JVMS (4.7.20)
    RuntimeVisibleTypeAnnotations {
        attribute_name_index: u16,
        annotations: &'c [TypeAnnotation<'c>],
    },
    RuntimeInvisibleTypeAnnotations {
        attribute_name_index: u16,
        annotations: &'c [TypeAnnotation<'c>],
    },

    /// JVMS (4.7.22)
    AnnotationDefault {
        attribute_name_index: u16,
        default_value: ElementValue<'c>,
    },

    /// JVMS (4.7.23)
    BootstrapMethods {
        attribute_name_index: u16,
        methods: &'c [BootstrapMethod<'c>],
    },

    /// JVMS (4.7.24)
    MethodParameters {
        attribute_name_index: u16,
        parameters: &'c [MethodParameter],
    },

    /// JVMS (4.7.25)
    Module {
        attribute_name_index: u16,
        module_name_index: u16,
        module_flags: u16,
        module_version_index: u16,
        requires: &'c [Requires],
        exports: &'c [Exports<'c>],
        opens: &'c [Opens<'c>],
        uses: &'c [u16],
        provides: &'c [Provides<'c>],
    },

    /// JVMS (4.7.26)
    ModulePackages {
        attribute_name_index: u16,
        package_index: &'c [u16],
    },

    /// JVMS (4.7.27)
    ModuleMainClass {
        attribute_name_index: u16,
        main_class_index: u16,
    },

    /// JVMS (4.7.28)
    NestHost {
        attribute_name_index: u16,
        host_class_index: u16,
    },

    /// JVMS (4.7.29)
    NestMembers {
        attribute_name_index: u16,
        classes: &'c [u16],
    },

    /// JVMS (4.7.30)
    Record {
        attribute_name_index: u16,
        components: &'c [RecordComponent<'c>],
    },

    /// JVMS (4.7.31)
    PermittedSubclasses {
        attribute_name_index: u16,
        classes: &'c [u16],
    },

    /// Any attribute whose name this module doesn't recognise. The payload is
    /// kept verbatim, `attribute_length` bytes of it.
    Unknown {
        attribute_name_index: u16,
        info: &'c [u8],
    },
}

/// An exception handler range inside a `Code` attribute.
///
/// `catch_type` is zero for a catch-all handler, otherwise a `Class` entry.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

/// One entry of an `InnerClasses` table.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: u16,
}

/// One entry of a `LineNumberTable`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

/// One entry of a `LocalVariableTable`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

/// One entry of a `LocalVariableTypeTable`; carries a signature where the
/// plain table carries a descriptor.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct LocalVariableType {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub signature_index: u16,
    pub index: u16,
}

/// Specifies the type state at a particular bytecode offset, JVMS (4.7.4).
///
/// A frame-type byte in the reserved range fails the parse with
/// [`ClassfileError::UnknownFrameType`] instead of producing a fallback.
#[derive(Debug, PartialEq, Clone)]
pub enum StackMapFrame<'c> {
    /// frame_type 0-63, `offset_delta` is the frame type itself.
    SameFrame { frame_type: u8 },
    /// frame_type 64-127, `offset_delta` is `frame_type - 64`.
    SameLocals1StackItem {
        frame_type: u8,
        stack: VerificationTypeInfo,
    },
    /// frame_type 247
    SameLocals1StackItemExtended {
        frame_type: u8,
        offset_delta: u16,
        stack: VerificationTypeInfo,
    },
    /// frame_type 248-250, the last `251 - frame_type` locals are absent.
    ChopFrame { frame_type: u8, offset_delta: u16 },
    /// frame_type 251
    SameFrameExtended { frame_type: u8, offset_delta: u16 },
    /// frame_type 252-254 with `frame_type - 251` extra locals.
    AppendFrame {
        frame_type: u8,
        offset_delta: u16,
        locals: &'c [VerificationTypeInfo],
    },
    /// frame_type 255
    FullFrame {
        frame_type: u8,
        offset_delta: u16,
        locals: &'c [VerificationTypeInfo],
        stack: &'c [VerificationTypeInfo],
    },
}

/// A stack value or local variable type inside a [`StackMapFrame`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    Uninitialized { offset: u16 },
}

/// A runtime annotation, JVMS (4.7.16).
#[derive(Debug, PartialEq, Clone)]
pub struct Annotation<'c> {
    pub type_index: u16,
    pub pairs: &'c [ElementValuePair<'c>],
}

/// An element-value pair in an [`Annotation`].
#[derive(Debug, PartialEq, Clone)]
pub struct ElementValuePair<'c> {
    pub element_name_index: u16,
    pub value: ElementValue<'c>,
}

/// The value of an annotation element, JVMS (4.7.16.1).
///
/// The tag character selects the shape: the eight primitive tags and `s` are
/// a single constant index, `e` an enum constant, `c` a class descriptor,
/// `@` a nested annotation and `[` an array.
#[derive(Debug, PartialEq, Clone)]
pub enum ElementValue<'c> {
    Const { tag: u8, const_value_index: u16 },
    EnumConst {
        type_name_index: u16,
        const_name_index: u16,
    },
    ClassInfo { class_info_index: u16 },
    Annotation(&'c Annotation<'c>),
    Array(&'c [ElementValue<'c>]),
}

/// The annotations of one formal parameter.
#[derive(Debug, PartialEq, Clone)]
pub struct ParameterAnnotations<'c> {
    pub annotations: &'c [Annotation<'c>],
}

/// A type annotation, JVMS (4.7.20).
#[derive(Debug, PartialEq, Clone)]
pub struct TypeAnnotation<'c> {
    pub target_type: u8,
    pub target_info: TargetInfo<'c>,
    pub type_path: &'c [TypePathEntry],
    pub type_index: u16,
    pub pairs: &'c [ElementValuePair<'c>],
}

/// Where a [`TypeAnnotation`] lands, selected by its `target_type` byte,
/// JVMS (4.7.20.1).
#[derive(Debug, PartialEq, Clone)]
pub enum TargetInfo<'c> {
    /// 0x00, 0x01
    TypeParameter { index: u8 },
    /// 0x10
    Supertype { index: u16 },
    /// 0x11, 0x12
    TypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    /// 0x13-0x15
    Empty,
    /// 0x16
    FormalParameter { index: u8 },
    /// 0x17
    Throws { index: u16 },
    /// 0x40, 0x41
    Localvar { table: &'c [LocalvarEntry] },
    /// 0x42
    Catch { exception_table_index: u16 },
    /// 0x43-0x46
    Offset { offset: u16 },
    /// 0x47-0x4B
    TypeArgument { offset: u16, index: u8 },
}

/// One live range of an annotated local variable.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct LocalvarEntry {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

/// One step into a compound type, JVMS (4.7.20.2).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TypePathEntry {
    pub kind: u8,
    pub type_argument_index: u8,
}

/// One `BootstrapMethods` table entry.
#[derive(Debug, PartialEq, Clone)]
pub struct BootstrapMethod<'c> {
    pub bootstrap_method_ref: u16,
    pub arguments: &'c [u16],
}

/// One `MethodParameters` table entry.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MethodParameter {
    pub name_index: u16,
    pub access_flags: u16,
}

/// A `requires` entry of the `Module` attribute.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Requires {
    pub requires_index: u16,
    pub requires_flags: u16,
    pub requires_version_index: u16,
}

/// An `exports` entry of the `Module` attribute.
#[derive(Debug, PartialEq, Clone)]
pub struct Exports<'c> {
    pub exports_index: u16,
    pub exports_flags: u16,
    pub exports_to_index: &'c [u16],
}

/// An `opens` entry of the `Module` attribute.
#[derive(Debug, PartialEq, Clone)]
pub struct Opens<'c> {
    pub opens_index: u16,
    pub opens_flags: u16,
    pub opens_to_index: &'c [u16],
}

/// A `provides` entry of the `Module` attribute.
#[derive(Debug, PartialEq, Clone)]
pub struct Provides<'c> {
    pub provides_index: u16,
    pub provides_with_index: &'c [u16],
}

/// One component of a `Record` attribute.
#[derive(Debug, PartialEq, Clone)]
pub struct RecordComponent<'c> {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: &'c [Attribute<'c>],
}

/// Parses a count-prefixed attribute table.
pub(super) fn get_attributes<'b, 'c>(
    reader: &mut Reader<'b>,
    pool: &ConstantPool<'c>,
    arena: &'c Bump,
) -> Result<&'c [Attribute<'c>], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut attributes = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        attributes.push(parse_attribute(reader, pool, arena)?);
    }

    Ok(attributes.into_bump_slice())
}

fn parse_attribute<'b, 'c>(
    reader: &mut Reader<'b>,
    pool: &ConstantPool<'c>,
    arena: &'c Bump,
) -> Result<Attribute<'c>, ClassfileError>
where
    'b: 'c,
{
    let attribute_name_index = reader.read::<u16>()?;
    let length = reader.read::<u32>()? as usize;
    let name = pool
        .utf8(attribute_name_index)
        .map_err(|_| ClassfileError::InvalidAttributeNameIndex(attribute_name_index))?;

    let attribute = match name {
        "ConstantValue" => Attribute::ConstantValue {
            attribute_name_index,
            constantvalue_index: reader.read()?,
        },
        "Code" => {
            let max_stack = reader.read()?;
            let max_locals = reader.read()?;
            let code_length = reader.read::<u32>()? as usize;
            let code = reader.read_bytes(code_length)?;

            let exception_count = reader.read::<u16>()? as usize;
            let mut exception_table = Vec::with_capacity_in(exception_count, arena);
            for _ in 0..exception_count {
                exception_table.push(ExceptionEntry {
                    start_pc: reader.read()?,
                    end_pc: reader.read()?,
                    handler_pc: reader.read()?,
                    catch_type: reader.read()?,
                });
            }

            Attribute::Code {
                attribute_name_index,
                max_stack,
                max_locals,
                code,
                exception_table: exception_table.into_bump_slice(),
                attributes: get_attributes(reader, pool, arena)?,
            }
        }
        "StackMapTable" => {
            let count = reader.read::<u16>()? as usize;
            let mut entries = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                entries.push(parse_stack_map_frame(reader, arena)?);
            }

            Attribute::StackMapTable {
                attribute_name_index,
                entries: entries.into_bump_slice(),
            }
        }
        "StackMap" => {
            let count = reader.read::<u16>()? as usize;
            let mut entries = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                // uncompressed legacy frame: absolute offset, full locals and
                // stack; normalised to a FullFrame carrying that offset
                let offset = reader.read::<u16>()?;
                let locals = parse_verification_types(reader, arena)?;
                let stack = parse_verification_types(reader, arena)?;
                entries.push(StackMapFrame::FullFrame {
                    frame_type: 255,
                    offset_delta: offset,
                    locals,
                    stack,
                });
            }

            Attribute::StackMap {
                attribute_name_index,
                entries: entries.into_bump_slice(),
            }
        }
        "Exceptions" => {
            let count = reader.read::<u16>()? as usize;
            let mut table = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                table.push(reader.read::<u16>()?);
            }

            Attribute::Exceptions {
                attribute_name_index,
                exception_index_table: table.into_bump_slice(),
            }
        }
        "InnerClasses" => {
            let count = reader.read::<u16>()? as usize;
            let mut classes = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                classes.push(InnerClass {
                    inner_class_info_index: reader.read()?,
                    outer_class_info_index: reader.read()?,
                    inner_name_index: reader.read()?,
                    inner_class_access_flags: reader.read()?,
                });
            }

            Attribute::InnerClasses {
                attribute_name_index,
                classes: classes.into_bump_slice(),
            }
        }
        "EnclosingMethod" => Attribute::EnclosingMethod {
            attribute_name_index,
            class_index: reader.read()?,
            method_index: reader.read()?,
        },
        "Synthetic" => Attribute::Synthetic {
            attribute_name_index,
        },
        "Signature" => Attribute::Signature {
            attribute_name_index,
            signature_index: reader.read()?,
        },
        "SourceFile" => Attribute::SourceFile {
            attribute_name_index,
            sourcefile_index: reader.read()?,
        },
        "SourceDebugExtension" => Attribute::SourceDebugExtension {
            attribute_name_index,
            debug_extension: alloc_str(reader.read_cesu8(length)?, arena),
        },
        "LineNumberTable" => {
            let count = reader.read::<u16>()? as usize;
            let mut entries = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                entries.push(LineNumber {
                    start_pc: reader.read()?,
                    line_number: reader.read()?,
                });
            }

            Attribute::LineNumberTable {
                attribute_name_index,
                entries: entries.into_bump_slice(),
            }
        }
        "LocalVariableTable" => {
            let count = reader.read::<u16>()? as usize;
            let mut entries = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                entries.push(LocalVariable {
                    start_pc: reader.read()?,
                    length: reader.read()?,
                    name_index: reader.read()?,
                    descriptor_index: reader.read()?,
                    index: reader.read()?,
                });
            }

            Attribute::LocalVariableTable {
                attribute_name_index,
                entries: entries.into_bump_slice(),
            }
        }
        "LocalVariableTypeTable" => {
            let count = reader.read::<u16>()? as usize;
            let mut entries = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                entries.push(LocalVariableType {
                    start_pc: reader.read()?,
                    length: reader.read()?,
                    name_index: reader.read()?,
                    signature_index: reader.read()?,
                    index: reader.read()?,
                });
            }

            Attribute::LocalVariableTypeTable {
                attribute_name_index,
                entries: entries.into_bump_slice(),
            }
        }
        "Deprecated" => Attribute::Deprecated {
            attribute_name_index,
        },
        "RuntimeVisibleAnnotations" => Attribute::RuntimeVisibleAnnotations {
            attribute_name_index,
            annotations: parse_annotations(reader, arena)?,
        },
        "RuntimeInvisibleAnnotations" => Attribute::RuntimeInvisibleAnnotations {
            attribute_name_index,
            annotations: parse_annotations(reader, arena)?,
        },
        "RuntimeVisibleParameterAnnotations" => Attribute::RuntimeVisibleParameterAnnotations {
            attribute_name_index,
            parameters: parse_parameter_annotations(reader, arena)?,
        },
        "RuntimeInvisibleParameterAnnotations" => Attribute::RuntimeInvisibleParameterAnnotations {
            attribute_name_index,
            parameters: parse_parameter_annotations(reader, arena)?,
        },
        "RuntimeVisibleTypeAnnotations" => Attribute::RuntimeVisibleTypeAnnotations {
            attribute_name_index,
            annotations: parse_type_annotations(reader, arena)?,
        },
        "RuntimeInvisibleTypeAnnotations" => Attribute::RuntimeInvisibleTypeAnnotations {
            attribute_name_index,
            annotations: parse_type_annotations(reader, arena)?,
        },
        "AnnotationDefault" => Attribute::AnnotationDefault {
            attribute_name_index,
            default_value: parse_element_value(reader, arena)?,
        },
        "BootstrapMethods" => {
            let count = reader.read::<u16>()? as usize;
            let mut methods = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                let bootstrap_method_ref = reader.read()?;
                let arguments = parse_u16_table(reader, arena)?;
                methods.push(BootstrapMethod {
                    bootstrap_method_ref,
                    arguments,
                });
            }

            Attribute::BootstrapMethods {
                attribute_name_index,
                methods: methods.into_bump_slice(),
            }
        }
        "MethodParameters" => {
            // the count is a single byte here, unlike every other table
            let count = reader.read::<u8>()? as usize;
            let mut parameters = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                parameters.push(MethodParameter {
                    name_index: reader.read()?,
                    access_flags: reader.read()?,
                });
            }

            Attribute::MethodParameters {
                attribute_name_index,
                parameters: parameters.into_bump_slice(),
            }
        }
        "Module" => {
            let module_name_index = reader.read()?;
            let module_flags = reader.read()?;
            let module_version_index = reader.read()?;

            let requires_count = reader.read::<u16>()? as usize;
            let mut requires = Vec::with_capacity_in(requires_count, arena);
            for _ in 0..requires_count {
                requires.push(Requires {
                    requires_index: reader.read()?,
                    requires_flags: reader.read()?,
                    requires_version_index: reader.read()?,
                });
            }

            let exports_count = reader.read::<u16>()? as usize;
            let mut exports = Vec::with_capacity_in(exports_count, arena);
            for _ in 0..exports_count {
                let exports_index = reader.read()?;
                let exports_flags = reader.read()?;
                let exports_to_index = parse_u16_table(reader, arena)?;
                exports.push(Exports {
                    exports_index,
                    exports_flags,
                    exports_to_index,
                });
            }

            let opens_count = reader.read::<u16>()? as usize;
            let mut opens = Vec::with_capacity_in(opens_count, arena);
            for _ in 0..opens_count {
                let opens_index = reader.read()?;
                let opens_flags = reader.read()?;
                let opens_to_index = parse_u16_table(reader, arena)?;
                opens.push(Opens {
                    opens_index,
                    opens_flags,
                    opens_to_index,
                });
            }

            let uses = parse_u16_table(reader, arena)?;

            let provides_count = reader.read::<u16>()? as usize;
            let mut provides = Vec::with_capacity_in(provides_count, arena);
            for _ in 0..provides_count {
                let provides_index = reader.read()?;
                let provides_with_index = parse_u16_table(reader, arena)?;
                provides.push(Provides {
                    provides_index,
                    provides_with_index,
                });
            }

            Attribute::Module {
                attribute_name_index,
                module_name_index,
                module_flags,
                module_version_index,
                requires: requires.into_bump_slice(),
                exports: exports.into_bump_slice(),
                opens: opens.into_bump_slice(),
                uses,
                provides: provides.into_bump_slice(),
            }
        }
        "ModulePackages" => Attribute::ModulePackages {
            attribute_name_index,
            package_index: parse_u16_table(reader, arena)?,
        },
        "ModuleMainClass" => Attribute::ModuleMainClass {
            attribute_name_index,
            main_class_index: reader.read()?,
        },
        "NestHost" => Attribute::NestHost {
            attribute_name_index,
            host_class_index: reader.read()?,
        },
        "NestMembers" => Attribute::NestMembers {
            attribute_name_index,
            classes: parse_u16_table(reader, arena)?,
        },
        "Record" => {
            let count = reader.read::<u16>()? as usize;
            let mut components = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                components.push(RecordComponent {
                    name_index: reader.read()?,
                    descriptor_index: reader.read()?,
                    attributes: get_attributes(reader, pool, arena)?,
                });
            }

            Attribute::Record {
                attribute_name_index,
                components: components.into_bump_slice(),
            }
        }
        "PermittedSubclasses" => Attribute::PermittedSubclasses {
            attribute_name_index,
            classes: parse_u16_table(reader, arena)?,
        },
        _ => Attribute::Unknown {
            attribute_name_index,
            info: reader.read_bytes(length)?,
        },
    };

    Ok(attribute)
}

fn parse_u16_table<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [u16], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut table = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        table.push(reader.read::<u16>()?);
    }

    Ok(table.into_bump_slice())
}

fn parse_stack_map_frame<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<StackMapFrame<'c>, ClassfileError>
where
    'b: 'c,
{
    let frame_type = reader.read::<u8>()?;
    let frame = match frame_type {
        0..=63 => StackMapFrame::SameFrame { frame_type },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            frame_type,
            stack: parse_verification_type(reader)?,
        },
        247 => StackMapFrame::SameLocals1StackItemExtended {
            frame_type,
            offset_delta: reader.read()?,
            stack: parse_verification_type(reader)?,
        },
        248..=250 => StackMapFrame::ChopFrame {
            frame_type,
            offset_delta: reader.read()?,
        },
        251 => StackMapFrame::SameFrameExtended {
            frame_type,
            offset_delta: reader.read()?,
        },
        252..=254 => {
            let offset_delta = reader.read()?;
            let count = (frame_type - 251) as usize;
            let mut locals = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                locals.push(parse_verification_type(reader)?);
            }

            StackMapFrame::AppendFrame {
                frame_type,
                offset_delta,
                locals: locals.into_bump_slice(),
            }
        }
        255 => {
            let offset_delta = reader.read()?;
            let locals = parse_verification_types(reader, arena)?;
            let stack = parse_verification_types(reader, arena)?;

            StackMapFrame::FullFrame {
                frame_type,
                offset_delta,
                locals,
                stack,
            }
        }
        _ => return Err(ClassfileError::UnknownFrameType(frame_type)),
    };

    Ok(frame)
}

fn parse_verification_types<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [VerificationTypeInfo], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut types = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        types.push(parse_verification_type(reader)?);
    }

    Ok(types.into_bump_slice())
}

fn parse_verification_type(reader: &mut Reader) -> Result<VerificationTypeInfo, ClassfileError> {
    let tag = reader.read::<u8>()?;
    let info = match tag {
        0 => VerificationTypeInfo::Top,
        1 => VerificationTypeInfo::Integer,
        2 => VerificationTypeInfo::Float,
        3 => VerificationTypeInfo::Double,
        4 => VerificationTypeInfo::Long,
        5 => VerificationTypeInfo::Null,
        6 => VerificationTypeInfo::UninitializedThis,
        7 => VerificationTypeInfo::Object {
            cpool_index: reader.read()?,
        },
        8 => VerificationTypeInfo::Uninitialized {
            offset: reader.read()?,
        },
        _ => return Err(ClassfileError::UnknownVerificationTag(tag)),
    };

    Ok(info)
}

fn parse_annotations<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [Annotation<'c>], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut annotations = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        annotations.push(parse_annotation(reader, arena)?);
    }

    Ok(annotations.into_bump_slice())
}

fn parse_parameter_annotations<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [ParameterAnnotations<'c>], ClassfileError>
where
    'b: 'c,
{
    // one byte, not two: JVMS 4.7.18
    let count = reader.read::<u8>()? as usize;
    let mut parameters = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        parameters.push(ParameterAnnotations {
            annotations: parse_annotations(reader, arena)?,
        });
    }

    Ok(parameters.into_bump_slice())
}

fn parse_annotation<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<Annotation<'c>, ClassfileError>
where
    'b: 'c,
{
    let type_index = reader.read()?;
    Ok(Annotation {
        type_index,
        pairs: parse_element_value_pairs(reader, arena)?,
    })
}

fn parse_element_value_pairs<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [ElementValuePair<'c>], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut pairs = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        let element_name_index = reader.read()?;
        pairs.push(ElementValuePair {
            element_name_index,
            value: parse_element_value(reader, arena)?,
        });
    }

    Ok(pairs.into_bump_slice())
}

fn parse_element_value<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<ElementValue<'c>, ClassfileError>
where
    'b: 'c,
{
    let tag = reader.read::<u8>()?;
    let value = match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
            tag,
            const_value_index: reader.read()?,
        },
        b'e' => ElementValue::EnumConst {
            type_name_index: reader.read()?,
            const_name_index: reader.read()?,
        },
        b'c' => ElementValue::ClassInfo {
            class_info_index: reader.read()?,
        },
        b'@' => ElementValue::Annotation(arena.alloc(parse_annotation(reader, arena)?)),
        b'[' => {
            let count = reader.read::<u16>()? as usize;
            let mut values = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                values.push(parse_element_value(reader, arena)?);
            }

            ElementValue::Array(values.into_bump_slice())
        }
        _ => return Err(ClassfileError::UnknownElementValueTag(tag)),
    };

    Ok(value)
}

fn parse_type_annotations<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<&'c [TypeAnnotation<'c>], ClassfileError>
where
    'b: 'c,
{
    let count = reader.read::<u16>()? as usize;
    let mut annotations = Vec::with_capacity_in(count, arena);
    for _ in 0..count {
        annotations.push(parse_type_annotation(reader, arena)?);
    }

    Ok(annotations.into_bump_slice())
}

fn parse_type_annotation<'b, 'c>(
    reader: &mut Reader<'b>,
    arena: &'c Bump,
) -> Result<TypeAnnotation<'c>, ClassfileError>
where
    'b: 'c,
{
    let target_type = reader.read::<u8>()?;
    let target_info = match target_type {
        0x00 | 0x01 => TargetInfo::TypeParameter {
            index: reader.read()?,
        },
        0x10 => TargetInfo::Supertype {
            index: reader.read()?,
        },
        0x11 | 0x12 => TargetInfo::TypeParameterBound {
            type_parameter_index: reader.read()?,
            bound_index: reader.read()?,
        },
        0x13..=0x15 => TargetInfo::Empty,
        0x16 => TargetInfo::FormalParameter {
            index: reader.read()?,
        },
        0x17 => TargetInfo::Throws {
            index: reader.read()?,
        },
        0x40 | 0x41 => {
            let count = reader.read::<u16>()? as usize;
            let mut table = Vec::with_capacity_in(count, arena);
            for _ in 0..count {
                table.push(LocalvarEntry {
                    start_pc: reader.read()?,
                    length: reader.read()?,
                    index: reader.read()?,
                });
            }

            TargetInfo::Localvar {
                table: table.into_bump_slice(),
            }
        }
        0x42 => TargetInfo::Catch {
            exception_table_index: reader.read()?,
        },
        0x43..=0x46 => TargetInfo::Offset {
            offset: reader.read()?,
        },
        0x47..=0x4B => TargetInfo::TypeArgument {
            offset: reader.read()?,
            index: reader.read()?,
        },
        _ => return Err(ClassfileError::UnknownTypeAnnotationTarget(target_type)),
    };

    let path_length = reader.read::<u8>()? as usize;
    let mut type_path = Vec::with_capacity_in(path_length, arena);
    for _ in 0..path_length {
        type_path.push(TypePathEntry {
            kind: reader.read()?,
            type_argument_index: reader.read()?,
        });
    }

    let type_index = reader.read()?;
    Ok(TypeAnnotation {
        target_type,
        target_info,
        type_path: type_path.into_bump_slice(),
        type_index,
        pairs: parse_element_value_pairs(reader, arena)?,
    })
}
