//! Client tests against a stubbed WorldTides server.
