#![allow(dead_code)]
//! Helpers that synthesize small class files in memory, so the suite does not
//! depend on compiled `.class` fixtures.

/// Installs a fmt subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A constant pool under construction. Every push returns the 1-based index
/// the entry landed on; 8-byte constants claim two slots.
pub struct Pool {
    pub bytes: Vec<u8>,
    pub count: u16,
}

impl Pool {
    pub fn new() -> Self {
        Pool {
            bytes: Vec::new(),
            count: 1,
        }
    }

    fn claim(&mut self, slots: u16) -> u16 {
        let index = self.count;
        self.count += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        self.raw_utf8(value.as_bytes())
    }

    pub fn raw_utf8(&mut self, data: &[u8]) -> u16 {
        self.bytes.push(1);
        self.bytes.extend((data.len() as u16).to_be_bytes());
        self.bytes.extend(data);
        self.claim(1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.bytes.push(3);
        self.bytes.extend(value.to_be_bytes());
        self.claim(1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.bytes.push(5);
        self.bytes.extend(value.to_be_bytes());
        self.claim(2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.bytes.push(6);
        self.bytes.extend(value.to_be_bytes());
        self.claim(2)
    }

    pub fn class(&mut self, name_index: u16) -> u16 {
        self.bytes.push(7);
        self.bytes.extend(name_index.to_be_bytes());
        self.claim(1)
    }

    pub fn string(&mut self, utf8_index: u16) -> u16 {
        self.bytes.push(8);
        self.bytes.extend(utf8_index.to_be_bytes());
        self.claim(1)
    }

    pub fn name_and_type(&mut self, name_index: u16, descriptor_index: u16) -> u16 {
        self.bytes.push(12);
        self.bytes.extend(name_index.to_be_bytes());
        self.bytes.extend(descriptor_index.to_be_bytes());
        self.claim(1)
    }

    pub fn method_ref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        self.bytes.push(10);
        self.bytes.extend(class_index.to_be_bytes());
        self.bytes.extend(name_and_type_index.to_be_bytes());
        self.claim(1)
    }
}

/// A `field_info`/`method_info` record.
pub fn member(access_flags: u16, name_index: u16, descriptor_index: u16, attributes: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(access_flags.to_be_bytes());
    bytes.extend(name_index.to_be_bytes());
    bytes.extend(descriptor_index.to_be_bytes());
    bytes.extend((attributes.len() as u16).to_be_bytes());
    for attribute in attributes {
        bytes.extend(attribute);
    }

    bytes
}

/// An attribute record: name index, 32-bit payload length, payload.
pub fn attribute(name_index: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(name_index.to_be_bytes());
    bytes.extend((payload.len() as u32).to_be_bytes());
    bytes.extend(payload);
    bytes
}

/// A `Code` attribute with no exception handlers and no nested attributes.
pub fn code_attribute(name_index: u16, max_stack: u16, max_locals: u16, code: &[u8]) -> Vec<u8> {
    code_attribute_full(name_index, max_stack, max_locals, code, &[], &[])
}

/// A `Code` attribute with exception handler tuples
/// `(start_pc, end_pc, handler_pc, catch_type)` and nested attributes.
pub fn code_attribute_full(
    name_index: u16,
    max_stack: u16,
    max_locals: u16,
    code: &[u8],
    exceptions: &[(u16, u16, u16, u16)],
    nested: &[Vec<u8>],
) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend(max_stack.to_be_bytes());
    payload.extend(max_locals.to_be_bytes());
    payload.extend((code.len() as u32).to_be_bytes());
    payload.extend(code);
    payload.extend((exceptions.len() as u16).to_be_bytes());
    for (start_pc, end_pc, handler_pc, catch_type) in exceptions {
        payload.extend(start_pc.to_be_bytes());
        payload.extend(end_pc.to_be_bytes());
        payload.extend(handler_pc.to_be_bytes());
        payload.extend(catch_type.to_be_bytes());
    }
    payload.extend((nested.len() as u16).to_be_bytes());
    for entry in nested {
        payload.extend(entry);
    }
    attribute(name_index, &payload)
}

/// Assembles a complete class file, version 61.0.
pub fn assemble(
    pool: &Pool,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: &[u16],
    fields: &[Vec<u8>],
    methods: &[Vec<u8>],
    attributes: &[Vec<u8>],
) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(0xCAFEBABE_u32.to_be_bytes());
    bytes.extend(0u16.to_be_bytes());
    bytes.extend(61u16.to_be_bytes());
    bytes.extend(pool.count.to_be_bytes());
    bytes.extend(&pool.bytes);
    bytes.extend(access_flags.to_be_bytes());
    bytes.extend(this_class.to_be_bytes());
    bytes.extend(super_class.to_be_bytes());
    bytes.extend((interfaces.len() as u16).to_be_bytes());
    for index in interfaces {
        bytes.extend(index.to_be_bytes());
    }
    for table in [fields, methods] {
        bytes.extend((table.len() as u16).to_be_bytes());
        for entry in table {
            bytes.extend(entry);
        }
    }
    bytes.extend((attributes.len() as u16).to_be_bytes());
    for entry in attributes {
        bytes.extend(entry);
    }

    bytes
}

/// The class a `javac HelloWorld.java` would produce, minus the bytecode that
/// actually prints: two methods (`<init>` and `main`), no fields and a
/// `SourceFile` attribute.
///
/// Pool layout: 1 "HelloWorld", 2 Class(1), 3 "java/lang/Object", 4 Class(3),
/// 5 "<init>", 6 "()V", 7 "Code", 8 "main", 9 "([Ljava/lang/String;)V",
/// 10 "SourceFile", 11 "HelloWorld.java", 12 NameAndType(5, 6),
/// 13 Methodref(4, 12).
pub fn hello_world() -> Vec<u8> {
    let mut pool = Pool::new();
    let this_name = pool.utf8("HelloWorld");
    let this_class = pool.class(this_name);
    let object_name = pool.utf8("java/lang/Object");
    let object = pool.class(object_name);
    let init = pool.utf8("<init>");
    let void_descriptor = pool.utf8("()V");
    let code = pool.utf8("Code");
    let main = pool.utf8("main");
    let main_descriptor = pool.utf8("([Ljava/lang/String;)V");
    let source_file = pool.utf8("SourceFile");
    let file_name = pool.utf8("HelloWorld.java");
    let init_nat = pool.name_and_type(init, void_descriptor);
    let super_init = pool.method_ref(object, init_nat);

    // aload_0, invokespecial Object.<init>, return
    let mut init_code = vec![0x2A, 0xB7];
    init_code.extend(super_init.to_be_bytes());
    init_code.push(0xB1);

    let methods = [
        member(
            0x0001,
            init,
            void_descriptor,
            &[code_attribute(code, 1, 1, &init_code)],
        ),
        member(
            0x0009,
            main,
            main_descriptor,
            &[code_attribute(code, 0, 1, &[0xB1])],
        ),
    ];
    let attributes = [attribute(source_file, &file_name.to_be_bytes())];

    assemble(
        &pool, 0x0021, this_class, object, &[], &[], &methods, &attributes,
    )
}
