#![no_main]

use libfuzzer_sys::fuzz_target;
use dotshield::analysis::generics::resolve_type_with_method_args;
use dotshield::metadata::signatures::TypeSignature;
use dotshield::metadata::token::Token;

/// Builds a signature tree from a byte program, one node per byte.
fn build(data: &[u8]) -> TypeSignature {
    let mut sig = TypeSignature::I4;
    for &byte in data.iter().rev() {
        let operand = u32::from(byte >> 3);
        sig = match byte & 0b111 {
            0 => TypeSignature::ptr(sig),
            1 => TypeSignature::sz_array(sig),
            2 => TypeSignature::by_ref(sig),
            3 => TypeSignature::GenericParamType(operand),
            4 => TypeSignature::GenericParamMethod(operand),
            5 => TypeSignature::generic_inst(TypeSignature::Class(Token(0x0100_0001)), vec![sig]),
            6 => TypeSignature::generic_inst(TypeSignature::GenericParamType(operand), vec![sig]),
            _ => TypeSignature::Pinned(Box::new(sig)),
        };
    }
    sig
}

fuzz_target!(|data: &[u8]| {
    let sig = build(&data[..data.len().min(512)]);
    let type_args = [TypeSignature::Class(Token(0x0200_0002)), TypeSignature::String];
    let method_args = [TypeSignature::GenericParamType(1)];

    let _ = resolve_type_with_method_args(&sig, &type_args, &method_args);
});
