use std::sync::LazyLock;

use regex::Regex;

use super::client::{present, ServiceRequest};
use crate::{
    models::{ResourceRequirements, Resources, ServiceSpec},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Nano-units per CPU core.
const NANOS_PER_CPU: i128 = 1_000_000_000;

/// Memory sizes such as `512m`, `1.5GiB` or `2048`.
static MEMORY_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(\.\d+)*) ?([kKmMgGtTpP])?[iI]?[bB]?$").expect("memory size regex is valid")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An exact rational number with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratio {
    num: i128,
    den: i128,
}

/// Which side of the requirements a quantity is written to.
#[derive(Debug, Clone, Copy)]
enum Side {
    Reservation,
    Limit,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Applies the memory and CPU reservation and limit fields of the request.
///
/// The resource requirements block, and each of its reservation and limit blocks, is only
/// allocated when a field writes into it.
pub fn apply_resources(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
) -> Result<(), ValidationError> {
    if let Some(value) = present(&request.memory_reservation) {
        let bytes = parse_memory_bytes("memory-reservation", value)?;
        resources_mut(spec, Side::Reservation).memory_bytes = bytes;
    }

    if let Some(value) = present(&request.memory_limit) {
        let bytes = parse_memory_bytes("memory-limit", value)?;
        resources_mut(spec, Side::Limit).memory_bytes = bytes;
    }

    if let Some(value) = present(&request.cpu_reservation) {
        let nanos = parse_nano_cpus("cpu-reservation", value)?;
        resources_mut(spec, Side::Reservation).nano_cpus = nanos;
    }

    if let Some(value) = present(&request.cpu_limit) {
        let nanos = parse_nano_cpus("cpu-limit", value)?;
        resources_mut(spec, Side::Limit).nano_cpus = nanos;
    }

    Ok(())
}

/// Parses a CPU quantity into nano-CPUs.
///
/// Accepts decimals (`0.5`), exponents (`5e-1`) and fractions (`1/2`). The value must be
/// representable exactly in units of 10^-9 cores, so at most 9 significant fractional digits
/// are allowed.
///
/// ## Examples
///
/// ```
/// use swarmgate::spec::parse_nano_cpus;
///
/// assert_eq!(parse_nano_cpus("cpu-limit", "0.5").unwrap(), 500_000_000);
/// assert_eq!(parse_nano_cpus("cpu-limit", "1/4").unwrap(), 250_000_000);
/// assert!(parse_nano_cpus("cpu-limit", "1.2345678912").is_err());
/// ```
pub fn parse_nano_cpus(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidCpu {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let ratio = parse_ratio(value.trim()).ok_or_else(|| invalid("not a number"))?;
    if ratio.num < 0 {
        return Err(invalid("must not be negative"));
    }

    let scaled = ratio
        .num
        .checked_mul(NANOS_PER_CPU)
        .ok_or_else(|| invalid("value too large"))?;

    if scaled % ratio.den != 0 {
        return Err(invalid("cannot have more than 9 decimal places"));
    }

    i64::try_from(scaled / ratio.den).map_err(|_| invalid("value too large"))
}

/// Parses a memory size into bytes, using binary multipliers (`k` = 1024).
///
/// ## Examples
///
/// ```
/// use swarmgate::spec::parse_memory_bytes;
///
/// assert_eq!(parse_memory_bytes("memory-limit", "512m").unwrap(), 536_870_912);
/// assert_eq!(parse_memory_bytes("memory-limit", "1.5KiB").unwrap(), 1536);
/// ```
pub fn parse_memory_bytes(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidMemory {
        field,
        value: value.to_string(),
    };

    let captures = MEMORY_SIZE_REGEX.captures(value).ok_or_else(invalid)?;
    let size: f64 = captures[1].parse().map_err(|_| invalid())?;

    let exponent = match captures.get(3).map(|unit| unit.as_str().to_ascii_lowercase()) {
        None => 0,
        Some(unit) => match unit.as_str() {
            "k" => 1,
            "m" => 2,
            "g" => 3,
            "t" => 4,
            "p" => 5,
            _ => return Err(invalid()),
        },
    };

    let bytes = size * 1024f64.powi(exponent);
    if !bytes.is_finite() || bytes >= i64::MAX as f64 {
        return Err(invalid());
    }

    Ok(bytes as i64)
}

/// Returns the reservation or limit block, allocating the path to it on first use.
fn resources_mut(spec: &mut ServiceSpec, side: Side) -> &mut Resources {
    let requirements = spec
        .task
        .resources
        .get_or_insert_with(ResourceRequirements::default);

    match side {
        Side::Reservation => requirements.reservations.get_or_insert_with(Resources::default),
        Side::Limit => requirements.limits.get_or_insert_with(Resources::default),
    }
}

/// Parses `a/b` or a decimal with an optional exponent into an exact ratio.
fn parse_ratio(s: &str) -> Option<Ratio> {
    if let Some((num, den)) = s.split_once('/') {
        let num: i128 = parse_integer(num)?;
        let den: i128 = parse_integer(den)?;
        return match den {
            0 => None,
            d if d < 0 => Some(Ratio { num: -num, den: -d }),
            d => Some(Ratio { num, den: d }),
        };
    }

    parse_decimal(s)
}

/// Parses a plain, optionally signed integer.
fn parse_integer(s: &str) -> Option<i128> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse().ok()
}

/// Parses `[+-]digits[.digits][(e|E)[+-]digits]` into an exact ratio.
fn parse_decimal(s: &str) -> Option<Ratio> {
    let (negative, unsigned) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(index) => (&unsigned[..index], parse_integer(&unsigned[index + 1..])?),
        None => (unsigned, 0),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut num: i128 = 0;
    for b in whole.bytes().chain(fraction.bytes()) {
        if !b.is_ascii_digit() {
            return None;
        }
        num = num.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }

    if negative {
        num = -num;
    }

    // Value is num * 10^(exponent - fraction digits).
    let scale = exponent.checked_sub(fraction.len() as i128)?;
    if scale >= 0 {
        let factor = 10i128.checked_pow(u32::try_from(scale).ok()?)?;
        Some(Ratio {
            num: num.checked_mul(factor)?,
            den: 1,
        })
    } else {
        let den = 10i128.checked_pow(u32::try_from(-scale).ok()?)?;
        Some(Ratio { num, den })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
