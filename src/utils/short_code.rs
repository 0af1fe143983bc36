use nanoid::nanoid;

const SHORT_CODE_LEN: usize = 8;
const HEX_ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Random 8-character lowercase hex slug used in `/scan/{code}` URLs.
pub fn generate_short_code() -> String {
    let code = nanoid!(SHORT_CODE_LEN, &HEX_ALPHABET);
    log::debug!("Generated short code: {}", code);
    code
}
