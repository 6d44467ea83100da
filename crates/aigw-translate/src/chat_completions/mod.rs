pub mod openai2gcp_vertexai;
