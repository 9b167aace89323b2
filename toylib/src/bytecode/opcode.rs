use thiserror::Error;

/// Single-byte instruction tags. The discriminant is the wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Constant = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Pop = 5,
    True = 6,
    False = 7,
    Equal = 8,
    NotEqual = 9,
    GreaterThan = 10,
    JumpNotTrue = 11,
    Jump = 12,
    Null = 13,
    GetGlobal = 14,
    SetGlobal = 15,
    Minus = 16,
    Bang = 17,
    CallBuiltin = 18,
}

/// Display name and operand byte widths of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Definition {
    /// Total encoded size including the opcode byte.
    pub fn instruction_len(&self) -> usize {
        1 + self.operand_widths.iter().sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("opcode {0} undefined")]
pub struct UndefinedOpcode(pub u8);

const fn def(name: &'static str, operand_widths: &'static [usize]) -> Definition {
    Definition {
        name,
        operand_widths,
    }
}

// Indexed by opcode byte. Widths are part of the wire format.
static DEFINITIONS: [Definition; 19] = [
    def("OpConstant", &[2]),
    def("OpAdd", &[]),
    def("OpSub", &[]),
    def("OpMul", &[]),
    def("OpDiv", &[]),
    def("OpPop", &[]),
    def("OpTrue", &[]),
    def("OpFalse", &[]),
    def("OpEqual", &[]),
    def("OpNotEqual", &[]),
    def("OpGreaterThan", &[]),
    def("OpJumpNotTrue", &[2]),
    def("OpJump", &[2]),
    def("OpNull", &[]),
    def("OpGetGlobal", &[2]),
    def("OpSetGlobal", &[2]),
    def("OpMinus", &[]),
    def("OpBang", &[]),
    def("OpCallBuiltin", &[1, 1]),
];

const OPCODES: [Opcode; 19] = [
    Opcode::Constant,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Pop,
    Opcode::True,
    Opcode::False,
    Opcode::Equal,
    Opcode::NotEqual,
    Opcode::GreaterThan,
    Opcode::JumpNotTrue,
    Opcode::Jump,
    Opcode::Null,
    Opcode::GetGlobal,
    Opcode::SetGlobal,
    Opcode::Minus,
    Opcode::Bang,
    Opcode::CallBuiltin,
];

impl Opcode {
    pub fn from_byte(byte: u8) -> Result<Opcode, UndefinedOpcode> {
        OPCODES
            .get(byte as usize)
            .copied()
            .ok_or(UndefinedOpcode(byte))
    }

    pub fn definition(self) -> &'static Definition {
        &DEFINITIONS[self as usize]
    }
}

/// Looks up the definition of a raw opcode byte.
pub fn lookup(byte: u8) -> Result<&'static Definition, UndefinedOpcode> {
    Opcode::from_byte(byte).map(Opcode::definition)
}

/// Encodes one instruction: the opcode byte followed by each operand,
/// big-endian, at its declared width.
///
/// Operands must already fit their width; the compiler checks limits before
/// calling this. An operand that does not fit panics in debug builds and is
/// truncated to its low bytes in release builds.
pub fn make_instruction(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let def = op.definition();
    debug_assert_eq!(
        operands.len(),
        def.operand_widths.len(),
        "{} takes {} operands",
        def.name,
        def.operand_widths.len()
    );

    let mut instruction = vec![0u8; def.instruction_len()];
    instruction[0] = op as u8;

    let mut offset = 1;
    for (operand, width) in operands.iter().zip(def.operand_widths) {
        debug_assert!(
            *operand < 1usize << (8 * width),
            "{} operand {operand} does not fit a {width}-byte slot",
            def.name
        );
        match width {
            2 => instruction[offset..offset + 2].copy_from_slice(&(*operand as u16).to_be_bytes()),
            1 => instruction[offset] = *operand as u8,
            _ => unreachable!("unsupported operand width {width}"),
        }
        offset += width;
    }
    instruction
}

/// Decodes the operands that follow an opcode byte. `bytes` starts right
/// after the opcode. Returns `None` when the stream is too short.
pub fn read_operands(def: &Definition, bytes: &[u8]) -> Option<(Vec<usize>, usize)> {
    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;
    for width in def.operand_widths {
        let operand = match width {
            2 => read_u16(bytes.get(offset..offset + 2)?) as usize,
            1 => *bytes.get(offset)? as usize,
            _ => unreachable!("unsupported operand width {width}"),
        };
        operands.push(operand);
        offset += width;
    }
    Some((operands, offset))
}

pub fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}
