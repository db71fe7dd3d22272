mod common;
mod decision;
mod features;
