//! Shared numeric building blocks for indicator calculations.
//!
//! Rolling windows follow a strict rule: a window yields a value only when
//! every slot in it is defined. A window of identical values reports that
//! value as its mean and 0.0 as its deviation, exactly.

use crate::domain::indicator::Trigger;

/// Substitute for denominators that are exactly zero.
pub const EPSILON: f64 = 1e-9;

pub fn nonzero(x: f64) -> f64 {
    if x == 0.0 { EPSILON } else { x }
}

/// EMA with smoothing 2/(period+1), seeded by the first input.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

fn rolling<F>(values: &[Option<f64>], period: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let mut window: Vec<f64> = Vec::with_capacity(period.min(values.len()));
    for i in (period - 1)..values.len() {
        window.clear();
        window.extend(values[i + 1 - period..=i].iter().flatten());
        if window.len() == period {
            out[i] = reduce(&window);
        }
    }
    out
}

/// The shared value when every slot in the window holds the same number.
fn constant(window: &[f64]) -> Option<f64> {
    let first = *window.first()?;
    window.iter().all(|&x| x == first).then_some(first)
}

pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| {
        Some(constant(w).unwrap_or_else(|| w.iter().sum::<f64>() / w.len() as f64))
    })
}

/// Sample standard deviation (n - 1); a one-bar window has none.
pub fn rolling_sample_std(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| {
        if w.len() < 2 {
            return None;
        }
        if constant(w).is_some() {
            return Some(0.0);
        }
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (w.len() - 1) as f64;
        Some(var.sqrt())
    })
}

pub fn rolling_max(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().reduce(f64::max))
}

pub fn rolling_min(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().reduce(f64::min))
}

pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| Some(v)).collect()
}

/// Sign changes of `spread` (fast minus slow): Buy when the previous bar is
/// `<= 0` and the current `> 0`, Sell when previous `>= 0` and current `< 0`.
pub fn crossings(spread: &[Option<f64>]) -> Vec<Trigger> {
    let mut out = vec![Trigger::Neutral; spread.len()];
    for i in 1..spread.len() {
        if let (Some(prev), Some(cur)) = (spread[i - 1], spread[i]) {
            if prev <= 0.0 && cur > 0.0 {
                out[i] = Trigger::Buy;
            } else if prev >= 0.0 && cur < 0.0 {
                out[i] = Trigger::Sell;
            }
        }
    }
    out
}

/// Oscillator rule: Sell above `overbought`, Buy below `oversold`.
pub fn band_trigger(value: Option<f64>, oversold: f64, overbought: f64) -> Trigger {
    match value {
        Some(v) if v > overbought => Trigger::Sell,
        Some(v) if v < oversold => Trigger::Buy,
        _ => Trigger::Neutral,
    }
}
