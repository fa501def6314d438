use anyhow::{Context, Result};

#[extend::ext(name = StrExt)]
pub impl str {
  /// Splits on `sep` and trims surrounding whitespace from every field.
  fn split_fields(&self, sep: char) -> Vec<&str> {
    self.split(sep).map(str::trim).collect()
  }

  /// Parses a benchmark log number, tagging the error with the raw text.
  fn parse_number(&self) -> Result<f64> {
    self.parse().with_context(|| format!("invalid number {self:?}"))
  }
}
