//! MT19937 generator with a fixed, version-independent output stream.
//!
//! Seeding uses the reference `init_by_array` routine with a single 32-bit
//! key word. Bounded draws take the top `bit_length(n)` bits of each output
//! and reject values out of range. Nothing here depends on another crate's
//! sampling, so choices never change across releases.

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

pub(crate) struct Twister {
    state: [u32; N],
    index: usize,
}

impl Twister {
    /// Create a generator seeded with a single key word.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = 19_650_218;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }

        let mut i = 1;
        for _ in 0..N {
            let prev = state[i - 1];
            state[i] = (state[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525)).wrapping_add(seed);
            i += 1;
            if i >= N {
                state[0] = state[N - 1];
                i = 1;
            }
        }
        for _ in 0..N - 1 {
            let prev = state[i - 1];
            state[i] =
                (state[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941)).wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                state[0] = state[N - 1];
                i = 1;
            }
        }
        state[0] = UPPER_MASK;

        Self { state, index: N }
    }

    /// Next tempered 32-bit output.
    pub(crate) fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    pub(crate) fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        let bits = usize::BITS - n.leading_zeros();
        if bits > 32 {
            // A span with more than 2^32 alternatives cannot fit in a template.
            return 0;
        }
        loop {
            let candidate = (self.next_u32() >> (32 - bits)) as usize;
            if candidate < n {
                return candidate;
            }
        }
    }

    fn twist(&mut self) {
        for k in 0..N {
            let y = (self.state[k] & UPPER_MASK) | (self.state[(k + 1) % N] & LOWER_MASK);
            let mut next = self.state[(k + M) % N] ^ (y >> 1);
            if y & 1 == 1 {
                next ^= MATRIX_A;
            }
            self.state[k] = next;
        }
        self.index = 0;
    }
}
