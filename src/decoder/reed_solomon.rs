/// Reed-Solomon error correction for ECC200
/// ECC200 uses RS over GF(256) with primitive polynomial x^8 + x^5 + x^3 + x^2 + 1 (0x12D)
/// and generator roots alpha^1 .. alpha^k
/// GF(256) field operations using log/exp tables
pub struct Gf256;

const PRIMITIVE: u16 = 0x12D;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

static TABLES: ([u8; 256], [u8; 256]) = build_tables();

impl Gf256 {
    /// alpha^n
    pub fn exp(n: usize) -> u8 {
        TABLES.0[n % 255]
    }

    /// Discrete log of a non-zero element
    pub fn log(a: u8) -> usize {
        TABLES.1[a as usize] as usize
    }

    /// Field product
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        Self::exp(Self::log(a) + Self::log(b))
    }

    /// `a / b`; division by zero yields zero, callers check divisors first
    pub fn div(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        Self::exp(Self::log(a) + 255 - Self::log(b))
    }

    /// Evaluate a polynomial in ascending coefficient order
    fn eval_ascending(poly: &[u8], x: u8) -> u8 {
        poly.iter()
            .rev()
            .fold(0u8, |acc, &coeff| Self::mul(acc, x) ^ coeff)
    }
}

/// Generator polynomial with roots alpha^1 .. alpha^k, descending order, monic
fn generator(num_ecc: usize) -> Vec<u8> {
    let mut gpoly = vec![1u8];
    for i in 1..=num_ecc {
        let root = Gf256::exp(i);
        let mut next = vec![0u8; gpoly.len() + 1];
        for (j, &coeff) in gpoly.iter().enumerate() {
            next[j] ^= coeff;
            next[j + 1] ^= Gf256::mul(coeff, root);
        }
        gpoly = next;
    }
    gpoly
}

/// Reed-Solomon encoder: computes the ECC codewords of one block
pub struct ReedSolomonEncoder {
    generator: Vec<u8>,
}

impl ReedSolomonEncoder {
    /// Encoder producing `num_ecc_codewords` ECC codewords per block
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self {
            generator: generator(num_ecc_codewords),
        }
    }

    /// Remainder of `data * x^k` divided by the generator
    pub fn ecc(&self, data: &[u8]) -> Vec<u8> {
        let num_ecc = self.generator.len() - 1;
        let mut remainder = vec![0u8; num_ecc];
        if num_ecc == 0 {
            return remainder;
        }
        for &d in data {
            let factor = d ^ remainder[0];
            remainder.rotate_left(1);
            remainder[num_ecc - 1] = 0;
            for (r, &g) in remainder.iter_mut().zip(&self.generator[1..]) {
                *r ^= Gf256::mul(g, factor);
            }
        }
        remainder
    }
}

/// Reed-Solomon decoder for ECC200 blocks
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks with `num_ecc_codewords` ECC codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `received` (data followed by ECC) in place.
    ///
    /// Returns the number of corrected codewords.
    pub fn decode(&self, received: &mut [u8]) -> Result<usize, &'static str> {
        if received.len() > 255 {
            return Err("Block longer than the field allows");
        }

        let syndrome = self.calculate_syndrome(received);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        // Find error locator polynomial using Berlekamp-Massey
        let sigma = self.find_error_locator(&syndrome);
        if sigma.len() - 1 > self.num_ecc_codewords / 2 {
            return Err("Too many errors");
        }

        // Find error positions (Chien search)
        let error_positions = self.find_error_positions(&sigma, received.len())?;

        // Find error values (Forney algorithm)
        let error_values =
            self.find_error_values(&sigma, &syndrome, &error_positions, received.len())?;

        for (&pos, &value) in error_positions.iter().zip(&error_values) {
            received[pos] ^= value;
        }

        // Verify syndrome is now zero
        if self.calculate_syndrome(received).iter().any(|&s| s != 0) {
            return Err("Uncorrectable error");
        }

        Ok(error_positions.len())
    }

    /// S_i = r(alpha^(i+1)), with `received[0]` the coefficient of x^(n-1)
    fn calculate_syndrome(&self, received: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|i| {
                let x = Gf256::exp(i + 1);
                received
                    .iter()
                    .fold(0u8, |acc, &coeff| Gf256::mul(acc, x) ^ coeff)
            })
            .collect()
    }

    /// Berlekamp-Massey; returns the error locator in ascending order, trimmed
    fn find_error_locator(&self, syndrome: &[u8]) -> Vec<u8> {
        let mut sigma = vec![1u8];
        let mut b = vec![1u8];
        let mut delta_b: u8 = 1;
        let mut l = 0;
        let mut m = 1;

        for i in 0..syndrome.len() {
            let mut delta = syndrome[i];
            for j in 1..=l {
                if j < sigma.len() {
                    delta ^= Gf256::mul(sigma[j], syndrome[i - j]);
                }
            }

            if delta == 0 {
                m += 1;
                continue;
            }

            let previous = sigma.clone();
            let d = Gf256::div(delta, delta_b);
            if sigma.len() < b.len() + m {
                sigma.resize(b.len() + m, 0);
            }
            // sigma = sigma - d * x^m * b
            for (j, &coeff) in b.iter().enumerate() {
                sigma[j + m] ^= Gf256::mul(d, coeff);
            }

            if 2 * l <= i {
                b = previous;
                delta_b = delta;
                l = i + 1 - l;
                m = 1;
            } else {
                m += 1;
            }
        }

        while sigma.len() > 1 && sigma.last() == Some(&0) {
            sigma.pop();
        }
        sigma
    }

    fn find_error_positions(&self, sigma: &[u8], n: usize) -> Result<Vec<usize>, &'static str> {
        // sigma(x) = prod(1 - X_k * x) with X_k = alpha^(n-1-pos); roots at X_k^-1
        let positions: Vec<usize> = (0..n)
            .filter(|&i| {
                let x_inv = Gf256::exp(255 - (n - 1 - i) % 255);
                Gf256::eval_ascending(sigma, x_inv) == 0
            })
            .collect();

        if positions.len() != sigma.len() - 1 {
            return Err("Wrong number of error positions found");
        }
        Ok(positions)
    }

    fn find_error_values(
        &self,
        sigma: &[u8],
        syndrome: &[u8],
        error_positions: &[usize],
        n: usize,
    ) -> Result<Vec<u8>, &'static str> {
        // omega = syndrome * sigma mod x^(2t)
        let mut omega = vec![0u8; syndrome.len()];
        for (i, slot) in omega.iter_mut().enumerate() {
            for j in 0..=i.min(sigma.len() - 1) {
                *slot ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }
        }

        // sigma' keeps the odd terms: sum sigma[i] * x^(i-1)
        let sigma_prime: Vec<u8> = sigma
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &coeff)| if i % 2 == 1 { coeff } else { 0 })
            .collect();

        error_positions
            .iter()
            .map(|&pos| {
                let x_inv = Gf256::exp(255 - (n - 1 - pos) % 255);
                let denominator = Gf256::eval_ascending(&sigma_prime, x_inv);
                if denominator == 0 {
                    return Err("Sigma derivative is zero");
                }
                // Forney with first consecutive root alpha^1: e_k = omega(X_k^-1) / sigma'(X_k^-1)
                Ok(Gf256::div(Gf256::eval_ascending(&omega, x_inv), denominator))
            })
            .collect()
    }
}
