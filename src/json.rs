//! Resolving JSON renderer for parsed class files.
//!
//! The document mirrors the on-disk structure, but every field holding a
//! constant-pool index is emitted together with a `<field>_deref` sibling
//! carrying the referenced entry, rendered recursively. An index of zero, a
//! reserved slot or an out-of-range index dereferences to JSON null;
//! rendering never fails on a parsed class.
//!
//! Strings coming out of the class file are HTML-escaped before JSON
//! encoding, because the documents end up inside a browser-side tree viewer
//! that renders them as HTML.

use crate::classfile::attributes::{Attribute, ExceptionEntry};
use crate::classfile::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::classfile::fields::{Field, Method, MethodFlags};
use crate::classfile::{AccessFlags, Classfile};
use bitflags::Flags;
use serde_json::{Map, Value, json};

/// Renders the whole resolving document for a parsed class file.
pub fn render(classfile: &Classfile) -> Value {
    let pool = &classfile.constant_pool;
    let (major, minor) = classfile.version();

    let mut root = Map::new();
    root.insert("magic".into(), json!(format!("0x{:08X}", classfile.magic)));
    root.insert("minorVersion".into(), json!(minor));
    root.insert("majorVersion".into(), json!(major));
    root.insert("constantPoolCount".into(), json!(pool.len()));

    let entries: Vec<Value> = pool
        .slots()
        .iter()
        .enumerate()
        .map(|(index, slot)| match slot {
            Some(entry) => entry_value(pool, index as u16, entry),
            None => Value::Null,
        })
        .collect();
    root.insert("constantPool".into(), Value::Array(entries));

    root.insert(
        "accessFlags".into(),
        json!(flags_value(&classfile.access_flags)),
    );
    index_pair(&mut root, "thisClass", classfile.this_class, pool);
    index_pair(&mut root, "superClass", classfile.super_class, pool);

    root.insert("interfacesCount".into(), json!(classfile.interfaces.len()));
    root.insert("interfaces".into(), index_list(classfile.interfaces, pool));

    root.insert("fieldsCount".into(), json!(classfile.fields.len()));
    root.insert(
        "fields".into(),
        Value::Array(classfile.fields.iter().map(|f| field_value(f, pool)).collect()),
    );

    root.insert("methodsCount".into(), json!(classfile.methods.len()));
    root.insert(
        "methods".into(),
        Value::Array(
            classfile
                .methods
                .iter()
                .map(|m| method_value(m, pool))
                .collect(),
        ),
    );

    root.insert("attributesCount".into(), json!(classfile.attributes.len()));
    root.insert("attributes".into(), attributes_value(classfile.attributes, pool));

    Value::Object(root)
}

/// The inlined rendering of the pool entry behind `index`, or null when there
/// is nothing sensible behind it.
fn deref(pool: &ConstantPool, index: u16) -> Value {
    if index == 0 {
        return Value::Null;
    }

    match pool.get(index) {
        Ok(entry) => entry_value(pool, index, entry),
        Err(_) => Value::Null,
    }
}

/// Emits `key` with the raw index and `key_deref` with its resolution.
fn index_pair(map: &mut Map<String, Value>, key: &str, index: u16, pool: &ConstantPool) {
    map.insert(key.to_owned(), json!(index));
    map.insert(format!("{key}_deref"), deref(pool, index));
}

/// A table of bare pool indices, one `{index, index_deref}` object each.
fn index_list(indices: &[u16], pool: &ConstantPool) -> Value {
    Value::Array(
        indices
            .iter()
            .map(|&index| {
                let mut element = Map::new();
                index_pair(&mut element, "index", index, pool);
                Value::Object(element)
            })
            .collect(),
    )
}

fn flags_value<F: Flags<Bits = u16>>(flags: &F) -> String {
    let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
    format!("{} ({})", flags.bits(), names.join(" | "))
}

/// HTML-escapes a string payload before it reaches the JSON encoder.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Uppercase hex, two digits per byte, no separators.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

fn entry_value(pool: &ConstantPool, index: u16, entry: &ConstantPoolEntry) -> Value {
    let mut map = Map::new();
    map.insert("index".into(), json!(index));
    map.insert("tag".into(), json!(entry.tag_name()));

    match entry {
        ConstantPoolEntry::Utf8(value) => {
            map.insert("value".into(), json!(escape(value)));
        }
        ConstantPoolEntry::Integer(value) => {
            map.insert("value".into(), json!(value));
        }
        ConstantPoolEntry::Float(value) => {
            map.insert("value".into(), json!(value));
        }
        ConstantPoolEntry::Long(value) => {
            map.insert("value".into(), json!(value));
        }
        ConstantPoolEntry::Double(value) => {
            map.insert("value".into(), json!(value));
        }
        ConstantPoolEntry::Class(name_index)
        | ConstantPoolEntry::Module(name_index)
        | ConstantPoolEntry::Package(name_index) => {
            index_pair(&mut map, "nameIndex", *name_index, pool);
        }
        ConstantPoolEntry::StringRef(string_index) => {
            index_pair(&mut map, "stringIndex", *string_index, pool);
        }
        ConstantPoolEntry::FieldRef(class_index, name_and_type_index)
        | ConstantPoolEntry::MethodRef(class_index, name_and_type_index)
        | ConstantPoolEntry::InterfaceMethodRef(class_index, name_and_type_index) => {
            index_pair(&mut map, "classIndex", *class_index, pool);
            index_pair(&mut map, "nameAndTypeIndex", *name_and_type_index, pool);
        }
        ConstantPoolEntry::NameAndType(name_index, descriptor_index) => {
            index_pair(&mut map, "nameIndex", *name_index, pool);
            index_pair(&mut map, "descriptorIndex", *descriptor_index, pool);
        }
        ConstantPoolEntry::MethodHandle(reference_kind, reference_index) => {
            map.insert("referenceKind".into(), json!(reference_kind));
            index_pair(&mut map, "referenceIndex", *reference_index, pool);
        }
        ConstantPoolEntry::MethodType(descriptor_index) => {
            index_pair(&mut map, "descriptorIndex", *descriptor_index, pool);
        }
        ConstantPoolEntry::Dynamic(bootstrap_method_attr_index, name_and_type_index)
        | ConstantPoolEntry::InvokeDynamic(bootstrap_method_attr_index, name_and_type_index) => {
            index_pair(
                &mut map,
                "bootstrapMethodAttrIndex",
                *bootstrap_method_attr_index,
                pool,
            );
            index_pair(&mut map, "nameAndTypeIndex", *name_and_type_index, pool);
        }
    }

    Value::Object(map)
}

fn field_value(field: &Field, pool: &ConstantPool) -> Value {
    member_value(
        flags_value(&field.access_flags),
        field.name_index,
        field.descriptor_index,
        field.attributes,
        pool,
    )
}

fn method_value(method: &Method, pool: &ConstantPool) -> Value {
    member_value(
        flags_value(&method.access_flags),
        method.name_index,
        method.descriptor_index,
        method.attributes,
        pool,
    )
}

fn member_value(
    access_flags: String,
    name_index: u16,
    descriptor_index: u16,
    attributes: &[Attribute],
    pool: &ConstantPool,
) -> Value {
    let mut map = Map::new();
    map.insert("accessFlags".into(), json!(access_flags));
    index_pair(&mut map, "nameIndex", name_index, pool);
    index_pair(&mut map, "descriptorIndex", descriptor_index, pool);
    map.insert("attributesCount".into(), json!(attributes.len()));
    map.insert("attributes".into(), attributes_value(attributes, pool));
    Value::Object(map)
}

fn attributes_value(attributes: &[Attribute], pool: &ConstantPool) -> Value {
    Value::Array(
        attributes
            .iter()
            .map(|attribute| attribute_value(attribute, pool))
            .collect(),
    )
}

/// Opens an attribute object: name index pair first, then the recomputed
/// length when the variant has meaningful arithmetic for one.
fn header(
    map: &mut Map<String, Value>,
    attribute_name_index: u16,
    length: Option<usize>,
    pool: &ConstantPool,
) {
    index_pair(map, "attributeNameIndex", attribute_name_index, pool);
    if let Some(length) = length {
        map.insert("attributeLength".into(), json!(length));
    }
}

fn exception_value(entry: &ExceptionEntry, pool: &ConstantPool) -> Value {
    let mut map = Map::new();
    map.insert("startPc".into(), json!(entry.start_pc));
    map.insert("endPc".into(), json!(entry.end_pc));
    map.insert("handlerPc".into(), json!(entry.handler_pc));
    map.insert("catchType".into(), json!(entry.catch_type));
    map.insert("catchType_deref".into(), deref(pool, entry.catch_type));
    Value::Object(map)
}

fn attribute_value(attribute: &Attribute, pool: &ConstantPool) -> Value {
    let mut map = Map::new();

    match attribute {
        Attribute::ConstantValue {
            attribute_name_index,
            constantvalue_index,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            index_pair(&mut map, "constantvalueIndex", *constantvalue_index, pool);
        }
        Attribute::Code {
            attribute_name_index,
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        } => {
            // informational only: the exception table and nested attributes
            // are not part of this recomputed length
            header(&mut map, *attribute_name_index, Some(code.len() + 12), pool);
            map.insert("maxStack".into(), json!(max_stack));
            map.insert("maxLocals".into(), json!(max_locals));
            map.insert("codeLength".into(), json!(code.len()));
            map.insert("code".into(), json!(hex(code)));
            map.insert("exceptionTableLength".into(), json!(exception_table.len()));
            map.insert(
                "exceptionTable".into(),
                Value::Array(
                    exception_table
                        .iter()
                        .map(|entry| exception_value(entry, pool))
                        .collect(),
                ),
            );
            map.insert("attributesCount".into(), json!(attributes.len()));
            map.insert("attributes".into(), attributes_value(attributes, pool));
        }
        Attribute::StackMapTable {
            attribute_name_index,
            entries,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            map.insert("numberOfEntries".into(), json!(entries.len()));
            map.insert(
                "entries".into(),
                Value::Array(entries.iter().map(|_| json!("StackMapFrame")).collect()),
            );
            map.insert(
                "note".into(),
                json!("Stack map frames are parsed but not expanded in this view."),
            );
        }
        Attribute::StackMap {
            attribute_name_index,
            entries,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            map.insert("numberOfEntries".into(), json!(entries.len()));
            map.insert(
                "entries".into(),
                Value::Array(entries.iter().map(|_| json!("StackMapFrame")).collect()),
            );
            map.insert(
                "note".into(),
                json!(
                    "Legacy StackMap frames are normalised to full frames with absolute offsets and not expanded in this view."
                ),
            );
        }
        Attribute::Exceptions {
            attribute_name_index,
            exception_index_table,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 2 * exception_index_table.len()),
                pool,
            );
            map.insert(
                "numberOfExceptions".into(),
                json!(exception_index_table.len()),
            );
            map.insert(
                "exceptionIndexTable".into(),
                index_list(exception_index_table, pool),
            );
        }
        Attribute::InnerClasses {
            attribute_name_index,
            classes,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 8 * classes.len()),
                pool,
            );
            map.insert("numberOfClasses".into(), json!(classes.len()));
            map.insert(
                "classes".into(),
                Value::Array(
                    classes
                        .iter()
                        .map(|class| {
                            let mut inner = Map::new();
                            index_pair(
                                &mut inner,
                                "innerClassInfoIndex",
                                class.inner_class_info_index,
                                pool,
                            );
                            index_pair(
                                &mut inner,
                                "outerClassInfoIndex",
                                class.outer_class_info_index,
                                pool,
                            );
                            index_pair(&mut inner, "innerNameIndex", class.inner_name_index, pool);
                            inner.insert(
                                "innerClassAccessFlags".into(),
                                json!(flags_value(&AccessFlags::from_bits_retain(
                                    class.inner_class_access_flags
                                ))),
                            );
                            Value::Object(inner)
                        })
                        .collect(),
                ),
            );
        }
        Attribute::EnclosingMethod {
            attribute_name_index,
            class_index,
            method_index,
        } => {
            header(&mut map, *attribute_name_index, Some(4), pool);
            index_pair(&mut map, "classIndex", *class_index, pool);
            index_pair(&mut map, "methodIndex", *method_index, pool);
        }
        Attribute::Synthetic {
            attribute_name_index,
        } => {
            header(&mut map, *attribute_name_index, Some(0), pool);
        }
        Attribute::Signature {
            attribute_name_index,
            signature_index,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            index_pair(&mut map, "signatureIndex", *signature_index, pool);
        }
        Attribute::SourceFile {
            attribute_name_index,
            sourcefile_index,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            index_pair(&mut map, "sourcefileIndex", *sourcefile_index, pool);
        }
        Attribute::SourceDebugExtension {
            attribute_name_index,
            debug_extension,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(debug_extension.len()),
                pool,
            );
            map.insert("debugExtension".into(), json!(escape(debug_extension)));
        }
        Attribute::LineNumberTable {
            attribute_name_index,
            entries,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 4 * entries.len()),
                pool,
            );
            map.insert("lineNumberTableLength".into(), json!(entries.len()));
            map.insert(
                "lineNumberTable".into(),
                Value::Array(
                    entries
                        .iter()
                        .map(|entry| {
                            json!({
                                "startPc": entry.start_pc,
                                "lineNumber": entry.line_number,
                            })
                        })
                        .collect(),
                ),
            );
        }
        Attribute::LocalVariableTable {
            attribute_name_index,
            entries,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 10 * entries.len()),
                pool,
            );
            map.insert("localVariableTableLength".into(), json!(entries.len()));
            map.insert(
                "localVariableTable".into(),
                Value::Array(
                    entries
                        .iter()
                        .map(|entry| {
                            let mut local = Map::new();
                            local.insert("startPc".into(), json!(entry.start_pc));
                            local.insert("length".into(), json!(entry.length));
                            index_pair(&mut local, "nameIndex", entry.name_index, pool);
                            index_pair(&mut local, "descriptorIndex", entry.descriptor_index, pool);
                            index_pair(&mut local, "index", entry.index, pool);
                            Value::Object(local)
                        })
                        .collect(),
                ),
            );
        }
        Attribute::LocalVariableTypeTable {
            attribute_name_index,
            entries,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 10 * entries.len()),
                pool,
            );
            map.insert("localVariableTypeTableLength".into(), json!(entries.len()));
            map.insert(
                "localVariableTypeTable".into(),
                Value::Array(
                    entries
                        .iter()
                        .map(|entry| {
                            let mut local = Map::new();
                            local.insert("startPc".into(), json!(entry.start_pc));
                            local.insert("length".into(), json!(entry.length));
                            index_pair(&mut local, "nameIndex", entry.name_index, pool);
                            index_pair(&mut local, "signatureIndex", entry.signature_index, pool);
                            index_pair(&mut local, "index", entry.index, pool);
                            Value::Object(local)
                        })
                        .collect(),
                ),
            );
        }
        Attribute::Deprecated {
            attribute_name_index,
        } => {
            header(&mut map, *attribute_name_index, Some(0), pool);
        }
        Attribute::RuntimeVisibleAnnotations {
            attribute_name_index,
            annotations,
        }
        | Attribute::RuntimeInvisibleAnnotations {
            attribute_name_index,
            annotations,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            map.insert("numAnnotations".into(), json!(annotations.len()));
            map.insert(
                "annotations".into(),
                Value::Array(annotations.iter().map(|_| json!("Annotation")).collect()),
            );
            map.insert(
                "note".into(),
                json!("Annotations are parsed but not expanded in this view."),
            );
        }
        Attribute::RuntimeVisibleParameterAnnotations {
            attribute_name_index,
            parameters,
        }
        | Attribute::RuntimeInvisibleParameterAnnotations {
            attribute_name_index,
            parameters,
        } => {
            header(&mut map, *attribute_name_index, Some(1), pool);
            map.insert("numParameters".into(), json!(parameters.len()));
            map.insert(
                "parameterAnnotations".into(),
                Value::Array(
                    parameters
                        .iter()
                        .map(|parameter| {
                            json!(format!("{} annotations", parameter.annotations.len()))
                        })
                        .collect(),
                ),
            );
            map.insert(
                "note".into(),
                json!("Parameter annotations are parsed but not expanded in this view."),
            );
        }
        Attribute::RuntimeVisibleTypeAnnotations {
            attribute_name_index,
            annotations,
        }
        | Attribute::RuntimeInvisibleTypeAnnotations {
            attribute_name_index,
            annotations,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            map.insert("numAnnotations".into(), json!(annotations.len()));
            map.insert(
                "annotations".into(),
                Value::Array(annotations.iter().map(|_| json!("TypeAnnotation")).collect()),
            );
            map.insert(
                "note".into(),
                json!("Type annotations are parsed but not expanded in this view."),
            );
        }
        Attribute::AnnotationDefault {
            attribute_name_index,
            ..
        } => {
            header(&mut map, *attribute_name_index, None, pool);
            map.insert("defaultValue".into(), json!("ElementValue"));
            map.insert(
                "note".into(),
                json!("The default element value is parsed but not expanded in this view."),
            );
        }
        Attribute::BootstrapMethods {
            attribute_name_index,
            methods,
        } => {
            let length = 2 + methods
                .iter()
                .map(|method| 4 + 2 * method.arguments.len())
                .sum::<usize>();
            header(&mut map, *attribute_name_index, Some(length), pool);
            map.insert("numBootstrapMethods".into(), json!(methods.len()));
            map.insert(
                "bootstrapMethods".into(),
                Value::Array(
                    methods
                        .iter()
                        .map(|method| {
                            let mut bootstrap = Map::new();
                            index_pair(
                                &mut bootstrap,
                                "bootstrapMethodRef",
                                method.bootstrap_method_ref,
                                pool,
                            );
                            bootstrap.insert(
                                "numBootstrapArguments".into(),
                                json!(method.arguments.len()),
                            );
                            bootstrap.insert(
                                "bootstrapArguments".into(),
                                index_list(method.arguments, pool),
                            );
                            Value::Object(bootstrap)
                        })
                        .collect(),
                ),
            );
        }
        Attribute::MethodParameters {
            attribute_name_index,
            parameters,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(1 + 4 * parameters.len()),
                pool,
            );
            map.insert("parametersCount".into(), json!(parameters.len()));
            map.insert(
                "parameters".into(),
                Value::Array(
                    parameters
                        .iter()
                        .map(|parameter| {
                            let mut value = Map::new();
                            index_pair(&mut value, "nameIndex", parameter.name_index, pool);
                            value.insert(
                                "accessFlags".into(),
                                json!(flags_value(&MethodFlags::from_bits_retain(
                                    parameter.access_flags
                                ))),
                            );
                            Value::Object(value)
                        })
                        .collect(),
                ),
            );
        }
        Attribute::Module {
            attribute_name_index,
            module_name_index,
            module_flags,
            module_version_index,
            requires,
            exports,
            opens,
            uses,
            provides,
        } => {
            header(&mut map, *attribute_name_index, None, pool);
            index_pair(&mut map, "moduleNameIndex", *module_name_index, pool);
            map.insert("moduleFlags".into(), json!(module_flags));
            index_pair(&mut map, "moduleVersionIndex", *module_version_index, pool);
            map.insert("requiresCount".into(), json!(requires.len()));
            map.insert("exportsCount".into(), json!(exports.len()));
            map.insert("opensCount".into(), json!(opens.len()));
            map.insert("usesCount".into(), json!(uses.len()));
            map.insert("providesCount".into(), json!(provides.len()));
            map.insert(
                "note".into(),
                json!("Module tables are parsed but summarised to their counts in this view."),
            );
        }
        Attribute::ModulePackages {
            attribute_name_index,
            package_index,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 2 * package_index.len()),
                pool,
            );
            map.insert("packageCount".into(), json!(package_index.len()));
            map.insert("packageIndex".into(), index_list(package_index, pool));
        }
        Attribute::ModuleMainClass {
            attribute_name_index,
            main_class_index,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            index_pair(&mut map, "mainClassIndex", *main_class_index, pool);
        }
        Attribute::NestHost {
            attribute_name_index,
            host_class_index,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            index_pair(&mut map, "hostClassIndex", *host_class_index, pool);
        }
        Attribute::NestMembers {
            attribute_name_index,
            classes,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 2 * classes.len()),
                pool,
            );
            map.insert("numberOfClasses".into(), json!(classes.len()));
            map.insert("classes".into(), index_list(classes, pool));
        }
        Attribute::Record {
            attribute_name_index,
            components,
        } => {
            header(&mut map, *attribute_name_index, Some(2), pool);
            map.insert("componentsCount".into(), json!(components.len()));
            map.insert(
                "components".into(),
                Value::Array(components.iter().map(|_| json!("RecordComponent")).collect()),
            );
            map.insert(
                "note".into(),
                json!("Record components are parsed but not expanded in this view."),
            );
        }
        Attribute::PermittedSubclasses {
            attribute_name_index,
            classes,
        } => {
            header(
                &mut map,
                *attribute_name_index,
                Some(2 + 2 * classes.len()),
                pool,
            );
            map.insert("numberOfClasses".into(), json!(classes.len()));
            map.insert("classes".into(), index_list(classes, pool));
        }
        Attribute::Unknown {
            attribute_name_index,
            info,
        } => {
            header(&mut map, *attribute_name_index, Some(info.len()), pool);
            map.insert(
                "info".into(),
                json!(format!("Binary data ({} bytes)", info.len())),
            );
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::fields::FieldFlags;

    #[test]
    fn escapes_html_sensitive_characters() {
        assert_eq!(escape("<init>"), "&lt;init&gt;");
        assert_eq!(escape("a&b"), "a&amp;b");
        assert_eq!(escape("\"quoted\" 'single'"), "&quot;quoted&quot; &#39;single&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn flags_render_with_mnemonics() {
        let flags = AccessFlags::from_bits_retain(0x0021);
        assert_eq!(flags_value(&flags), "33 (PUBLIC | SUPER)");

        let empty = FieldFlags::from_bits_retain(0);
        assert_eq!(flags_value(&empty), "0 ()");

        // undefined bits survive in the decimal but name nothing
        let raw = MethodFlags::from_bits_retain(0x4009);
        assert_eq!(flags_value(&raw), "16393 (PUBLIC | STATIC)");
    }

    #[test]
    fn hex_is_uppercase_and_unseparated() {
        assert_eq!(hex(&[0x2A, 0xB7, 0x00, 0x0C, 0xB1]), "2AB7000CB1");
        assert_eq!(hex(&[]), "");
    }
}
