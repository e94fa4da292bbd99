#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vp9parse_core::BitReader;

#[derive(Arbitrary, Debug)]
struct BitReaderInput {
    data: Vec<u8>,
    operations: Vec<BitOperation>,
}

#[derive(Arbitrary, Debug)]
enum BitOperation {
    ReadBit,
    ReadBits(u8),
    ReadSigned(u8),
}

fuzz_target!(|input: BitReaderInput| {
    if input.data.is_empty() {
        return;
    }

    let mut reader = BitReader::new(&input.data);

    for op in input.operations.iter().take(100) {
        match op {
            BitOperation::ReadBit => {
                let _ = reader.read_bit();
            }
            BitOperation::ReadBits(n) => {
                let bits = (*n % 32).max(1);
                let _ = reader.read_bits(bits);
            }
            BitOperation::ReadSigned(n) => {
                let bits = *n % 31;
                let _ = reader.read_signed(bits);
            }
        }

        if reader.remaining_bits() == 0 {
            break;
        }
    }
});
