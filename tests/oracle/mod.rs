mod beta_oracle;
mod determinant;
