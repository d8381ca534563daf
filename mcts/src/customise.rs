use log::warn;

/// Outcome of applying a single `key=value` override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideResult {
    Applied,
    UnknownKey,
    InvalidValue,
}

/// Typed strategy options that accept string overrides.
pub trait Hyperparameters {
    /// `key` is already lower-cased and trimmed.
    fn set(&mut self, key: &str, value: &str) -> OverrideResult;
}

/// Applies `key=value` tokens to `options`.
///
/// A leading token without `=` is the strategy name and is skipped. Keys are matched
/// case-insensitively. Anything that cannot be applied is logged and leaves the previous
/// value in place.
pub fn apply_overrides<H>(strategy: &str, options: &mut H, inputs: &[&str])
where
    H: Hyperparameters + ?Sized,
{
    let tokens = match inputs.first() {
        Some(first) if !first.contains('=') => &inputs[1..],
        _ => inputs,
    };

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            warn!("{}: ignoring token without '=': {:?}", strategy, token);
            continue;
        };

        let key = key.trim().to_lowercase();
        let value = value.trim();

        match options.set(&key, value) {
            OverrideResult::Applied => {}
            OverrideResult::UnknownKey => {
                warn!("{}: ignoring unknown option {:?}", strategy, key);
            }
            OverrideResult::InvalidValue => {
                warn!("{}: ignoring invalid value {:?} for {:?}", strategy, value, key);
            }
        }
    }
}

pub(crate) fn set_f64(target: &mut f64, value: &str) -> OverrideResult {
    match value.parse::<f64>() {
        Ok(parsed) if !parsed.is_nan() => {
            *target = parsed;
            OverrideResult::Applied
        }
        _ => OverrideResult::InvalidValue,
    }
}

pub(crate) fn set_u32(target: &mut u32, value: &str) -> OverrideResult {
    match value.parse::<u32>() {
        Ok(parsed) => {
            *target = parsed;
            OverrideResult::Applied
        }
        Err(_) => OverrideResult::InvalidValue,
    }
}
