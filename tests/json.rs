mod common;

use common::{Pool, assemble, attribute, hello_world, member};
use serde_json::Value;

fn document(bytes: &[u8]) -> Value {
    serde_json::from_str(&lupa::inspect(bytes).unwrap()).unwrap()
}

/// Every `<key>_deref` must be null or an object whose `index` equals the
/// sibling `<key>` value.
fn check_deref_pairs(value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if let Some(plain) = key.strip_suffix("_deref") {
                    let index = map
                        .get(plain)
                        .and_then(Value::as_u64)
                        .expect("every _deref has a numeric index sibling");
                    match child {
                        Value::Null => {}
                        Value::Object(target) => {
                            assert_eq!(target.get("index").and_then(Value::as_u64), Some(index));
                        }
                        other => panic!("_deref must be null or an object, got {other}"),
                    }
                }
                check_deref_pairs(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                check_deref_pairs(item);
            }
        }
        _ => {}
    }
}

#[test]
fn hello_world_document() {
    common::init_tracing();
    let doc = document(&hello_world());

    assert_eq!(doc["magic"], "0xCAFEBABE");
    assert_eq!(doc["minorVersion"], 0);
    assert_eq!(doc["majorVersion"], 61);
    assert_eq!(doc["constantPoolCount"], 14);
    assert_eq!(doc["constantPool"][0], Value::Null);
    assert_eq!(doc["accessFlags"], "33 (PUBLIC | SUPER)");

    assert_eq!(doc["thisClass"], 2);
    assert_eq!(doc["thisClass_deref"]["tag"], "CONSTANT_Class");
    assert_eq!(doc["thisClass_deref"]["nameIndex_deref"]["value"], "HelloWorld");
    assert_eq!(
        doc["superClass_deref"]["nameIndex_deref"]["value"],
        "java/lang/Object"
    );

    assert_eq!(doc["interfacesCount"], 0);
    assert_eq!(doc["fieldsCount"], 0);
    assert_eq!(doc["methodsCount"], 2);

    let main = &doc["methods"][1];
    assert_eq!(main["accessFlags"], "9 (PUBLIC | STATIC)");
    assert_eq!(main["nameIndex_deref"]["value"], "main");
    assert_eq!(
        main["descriptorIndex_deref"]["value"],
        "([Ljava/lang/String;)V"
    );

    let code = &main["attributes"][0];
    assert_eq!(code["attributeNameIndex_deref"]["value"], "Code");
    assert_eq!(code["attributeLength"], 13);
    assert_eq!(code["codeLength"], 1);
    assert_eq!(code["code"], "B1");
    assert_eq!(code["exceptionTableLength"], 0);
    assert_eq!(code["exceptionTable"], Value::Array(Vec::new()));

    let source_file = &doc["attributes"][0];
    assert_eq!(source_file["attributeNameIndex_deref"]["value"], "SourceFile");
    assert_eq!(
        source_file["sourcefileIndex_deref"]["value"],
        "HelloWorld.java"
    );
}

#[test]
fn methodref_inlines_recursively() {
    let doc = document(&hello_world());

    // entry 13 is Methodref(4, 12): its class and name-and-type chains must
    // be fully inlined
    let methodref = &doc["constantPool"][13];
    assert_eq!(methodref["tag"], "CONSTANT_Methodref");
    assert_eq!(
        methodref["classIndex_deref"]["nameIndex_deref"]["value"],
        "java/lang/Object"
    );
    assert_eq!(
        methodref["nameAndTypeIndex_deref"]["nameIndex_deref"]["value"],
        "&lt;init&gt;"
    );
    assert_eq!(
        methodref["nameAndTypeIndex_deref"]["descriptorIndex_deref"]["value"],
        "()V"
    );
}

#[test]
fn html_sensitive_names_are_escaped() {
    let text = lupa::inspect(&hello_world()).unwrap();

    assert!(text.contains("&lt;init&gt;"));
    assert!(!text.contains("<init>"));
}

#[test]
fn rendering_is_idempotent() {
    let bytes = hello_world();

    assert_eq!(lupa::inspect(&bytes).unwrap(), lupa::inspect(&bytes).unwrap());
}

#[test]
fn every_deref_mirrors_its_index() {
    check_deref_pairs(&document(&hello_world()));
}

#[test]
fn unknown_attribute_renders_its_size() {
    let mut pool = Pool::new();
    let name = pool.utf8("Mystery");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let foo_bar = pool.utf8("FooBar");

    let attributes = [attribute(foo_bar, &[1, 2, 3, 4])];
    let bytes = assemble(&pool, 0x0021, this_class, object, &[], &[], &[], &attributes);
    let doc = document(&bytes);

    let unknown = &doc["attributes"][0];
    assert_eq!(unknown["attributeNameIndex_deref"]["value"], "FooBar");
    assert_eq!(unknown["attributeLength"], 4);
    assert_eq!(unknown["info"], "Binary data (4 bytes)");
}

#[test]
fn dangling_indices_dereference_to_null() {
    let mut pool = Pool::new();
    let name = pool.utf8("Dangling");
    let this_class = pool.class(name);
    // a Class entry whose name index points far outside the pool
    let broken = pool.class(999);

    let bytes = assemble(&pool, 0x0021, this_class, broken, &[], &[], &[], &[]);
    let doc = document(&bytes);

    assert_eq!(doc["superClass_deref"]["nameIndex"], 999);
    assert_eq!(doc["superClass_deref"]["nameIndex_deref"], Value::Null);
    check_deref_pairs(&doc);
}

#[test]
fn zero_access_flags_render_with_empty_names() {
    let mut pool = Pool::new();
    let name = pool.utf8("Bare");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let field_name = pool.utf8("value");
    let descriptor = pool.utf8("I");

    let fields = [member(0, field_name, descriptor, &[])];
    let bytes = assemble(&pool, 0x0021, this_class, object, &[], &fields, &[], &[]);
    let doc = document(&bytes);

    assert_eq!(doc["fields"][0]["accessFlags"], "0 ()");
}

#[test]
fn embedded_nul_survives_the_encoder() {
    let mut pool = Pool::new();
    let name = pool.utf8("Nul");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let nul = pool.raw_utf8(&[0xC0, 0x80]);

    let bytes = assemble(&pool, 0x0021, this_class, object, &[], &[], &[], &[]);
    let doc = document(&bytes);

    let value = doc["constantPool"][nul as usize]["value"]
        .as_str()
        .expect("nul constant must survive the round-trip");
    assert_eq!(value.chars().count(), 1);
    assert_eq!(value, "\u{0}");
}

#[test]
fn long_entries_leave_a_null_slot() {
    let mut pool = Pool::new();
    let name = pool.utf8("Widths");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let long = pool.long(7);

    let bytes = assemble(&pool, 0x0021, this_class, object, &[], &[], &[], &[]);
    let doc = document(&bytes);

    assert_eq!(doc["constantPool"][long as usize]["tag"], "CONSTANT_Long");
    assert_eq!(doc["constantPool"][long as usize]["value"], 7);
    assert_eq!(doc["constantPool"][long as usize + 1], Value::Null);
}

#[test]
fn code_renders_exception_table_and_frame_placeholders() {
    let mut pool = Pool::new();
    let name = pool.utf8("Guarded");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let method_name = pool.utf8("run");
    let descriptor = pool.utf8("()V");
    let code_name = pool.utf8("Code");
    let stack_map_name = pool.utf8("StackMapTable");
    let throwable_name = pool.utf8("java/lang/Throwable");
    let throwable = pool.class(throwable_name);

    let stack_map = {
        let mut payload = Vec::new();
        payload.extend(1u16.to_be_bytes());
        payload.push(0); // same_frame
        attribute(stack_map_name, &payload)
    };
    let code = common::code_attribute_full(
        code_name,
        1,
        1,
        &[0xB1, 0xB1],
        &[(0, 1, 1, throwable)],
        &[stack_map],
    );
    let methods = [member(0x0001, method_name, descriptor, &[code])];
    let bytes = assemble(&pool, 0x0021, this_class, object, &[], &[], &methods, &[]);
    let doc = document(&bytes);

    let code = &doc["methods"][0]["attributes"][0];
    assert_eq!(code["code"], "B1B1");
    assert_eq!(code["exceptionTableLength"], 1);
    let handler = &code["exceptionTable"][0];
    assert_eq!(handler["startPc"], 0);
    assert_eq!(handler["endPc"], 1);
    assert_eq!(handler["handlerPc"], 1);
    assert_eq!(handler["catchType"], throwable as u64);
    assert_eq!(
        handler["catchType_deref"]["nameIndex_deref"]["value"],
        "java/lang/Throwable"
    );

    let stack_map = &code["attributes"][0];
    assert_eq!(stack_map["attributeNameIndex_deref"]["value"], "StackMapTable");
    assert_eq!(stack_map["numberOfEntries"], 1);
    assert_eq!(stack_map["entries"][0], "StackMapFrame");
    assert!(stack_map["note"].is_string());

    check_deref_pairs(&doc);
}

#[test]
fn interfaces_render_as_index_pairs() {
    let mut pool = Pool::new();
    let name = pool.utf8("Worker");
    let this_class = pool.class(name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let serializable_name = pool.utf8("java/io/Serializable");
    let serializable = pool.class(serializable_name);

    let bytes = assemble(
        &pool,
        0x0021,
        this_class,
        object,
        &[serializable],
        &[],
        &[],
        &[],
    );
    let doc = document(&bytes);

    assert_eq!(doc["interfacesCount"], 1);
    let interface = &doc["interfaces"][0];
    assert_eq!(interface["index"], serializable as u64);
    assert_eq!(interface["index_deref"]["tag"], "CONSTANT_Class");
    assert_eq!(
        interface["index_deref"]["nameIndex_deref"]["value"],
        "java/io/Serializable"
    );
}
