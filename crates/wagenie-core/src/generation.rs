//! Generation-service ports and the two command handlers built on them.
//!
//! `CompletionService` and `ImageService` are implemented in
//! `wagenie-infra`; the handlers here are deliberately thin -- the
//! argument is the literal user prompt, and the service's output is the
//! reply text verbatim.

use std::future::Future;
use std::pin::Pin;

use wagenie_types::error::GenerationError;

/// Text-completion backend: prompt in, completion text out.
pub trait CompletionService: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Image-generation backend: prompt in, image locator (a URL) out.
///
/// The engine never downloads or re-encodes image bytes; it only forwards
/// the locator.
pub trait ImageService: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// One command implementation behind a router prefix.
///
/// Must produce exactly one reply text or fail; failures are recovered by
/// the router, never propagated to the transport layer.
pub trait CommandHandler: Send + Sync {
    fn handle(
        &self,
        argument: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Object-safe version of [`CommandHandler`] with boxed futures.
///
/// Exists solely so the router's command table can hold heterogeneous
/// handlers; blanket-implemented for every `CommandHandler`.
pub trait CommandHandlerDyn: Send + Sync {
    fn handle_boxed<'a>(
        &'a self,
        argument: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;
}

impl<T: CommandHandler> CommandHandlerDyn for T {
    fn handle_boxed<'a>(
        &'a self,
        argument: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
        Box::pin(self.handle(argument))
    }
}

/// Type-erased command handler for the router's prefix table.
pub struct BoxCommandHandler {
    inner: Box<dyn CommandHandlerDyn + Send + Sync>,
}

impl BoxCommandHandler {
    /// Wrap a concrete handler in a type-erased box.
    pub fn new<T: CommandHandler + 'static>(handler: T) -> Self {
        Self {
            inner: Box::new(handler),
        }
    }

    /// Run the handler on one argument.
    pub async fn handle(&self, argument: &str) -> Result<String, GenerationError> {
        self.inner.handle_boxed(argument).await
    }
}

/// `.ai` -- forwards the argument as a prompt to the completion backend
/// and returns the completion verbatim.
pub struct TextCompletionHandler<C> {
    service: C,
}

impl<C> TextCompletionHandler<C> {
    pub fn new(service: C) -> Self {
        Self { service }
    }
}

impl<C: CompletionService> CommandHandler for TextCompletionHandler<C> {
    async fn handle(&self, argument: &str) -> Result<String, GenerationError> {
        self.service.complete(argument).await
    }
}

/// `.img` -- requests exactly one image for the prompt and replies with
/// its locator URL, untransformed.
pub struct ImageGenerationHandler<I> {
    service: I,
}

impl<I> ImageGenerationHandler<I> {
    pub fn new(service: I) -> Self {
        Self { service }
    }
}

impl<I: ImageService> CommandHandler for ImageGenerationHandler<I> {
    async fn handle(&self, argument: &str) -> Result<String, GenerationError> {
        self.service.generate(argument).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCompletion;

    impl CompletionService for EchoCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("completion for: {prompt}"))
        }
    }

    struct FixedLocatorImage;

    impl ImageService for FixedLocatorImage {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("https://img.example/abc.png".to_string())
        }
    }

    struct FailingCompletion;

    impl CompletionService for FailingCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::QuotaExceeded)
        }
    }

    #[tokio::test]
    async fn text_handler_passes_prompt_verbatim() {
        let handler = TextCompletionHandler::new(EchoCompletion);
        let reply = handler.handle("hello").await.unwrap();
        assert_eq!(reply, "completion for: hello");
    }

    #[tokio::test]
    async fn image_handler_returns_locator_untransformed() {
        let handler = ImageGenerationHandler::new(FixedLocatorImage);
        let reply = handler.handle("a red fox").await.unwrap();
        assert_eq!(reply, "https://img.example/abc.png");
    }

    #[tokio::test]
    async fn handler_errors_surface_to_caller() {
        let handler = TextCompletionHandler::new(FailingCompletion);
        let err = handler.handle("anything").await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExceeded));
    }

    #[tokio::test]
    async fn boxed_handler_delegates() {
        let boxed = BoxCommandHandler::new(TextCompletionHandler::new(EchoCompletion));
        let reply = boxed.handle("boxed").await.unwrap();
        assert_eq!(reply, "completion for: boxed");
    }
}
