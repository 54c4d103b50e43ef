/// Table-driven, MSB-first 16-bit CRC (no reflection, no final xor).
///
/// `residue` is the register value expected after running the algorithm over
/// a message *and* its appended check value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crc16 {
    pub name: &'static str,
    pub init: u16,
    pub poly: u16,
    pub residue: u16,
    table: [u16; 256],
}

impl Crc16 {
    pub const fn new(name: &'static str, init: u16, poly: u16, residue: u16) -> Self {
        Self {
            name,
            init,
            poly,
            residue,
            table: build_table(poly),
        }
    }

    /// Run the register over `data`, starting from `init`.
    pub fn checksum(&self, data: &[u8]) -> u16 {
        let mut reg = self.init;
        for &b in data {
            reg = (reg << 8) ^ self.table[((reg >> 8) ^ b as u16) as usize];
        }
        reg
    }

    /// True when `data` (message followed by its check value) leaves the
    /// register at the expected residue.
    pub fn has_residue(&self, data: &[u8]) -> bool {
        self.checksum(data) == self.residue
    }
}

const fn build_table(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut reg = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            reg = if reg & 0x8000 != 0 {
                (reg << 1) ^ poly
            } else {
                reg << 1
            };
            bit += 1;
        }
        table[i] = reg;
        i += 1;
    }
    table
}
