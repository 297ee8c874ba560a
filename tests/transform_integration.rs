//! End-to-end tests for single-file transformation.

use mockshift::{SourceLanguage, TransformOptions, Transformer};
use pretty_assertions::assert_eq;

fn transform(source: &str) -> String {
    transform_with(source, TransformOptions::default())
}

fn transform_with(source: &str, options: TransformOptions) -> String {
    Transformer::new(options)
        .transform(source, SourceLanguage::JavaScript)
        .unwrap()
        .output
}

#[test]
fn test_removes_gating_import() {
    assert_eq!(
        transform("\n      import foo from 'foo'\n      import sinon from 'sinon-sandbox';\n"),
        "\n      import foo from 'foo'\n"
    );
}

#[test]
fn test_file_without_import_is_untouched() {
    let source = "const stub = sinon.stub(Api, 'get')\nexpect(stub.called).toBe(true)\n";
    let outcome = Transformer::default()
        .transform(source, SourceLanguage::JavaScript)
        .unwrap();
    assert!(outcome.gated);
    assert_eq!(outcome.output, source);
}

#[test]
fn test_skip_import_detection_forces_the_pipeline() {
    let source = "const stub = sinon.stub(Api, 'get')\n";
    assert_eq!(
        transform_with(source, TransformOptions::default().skip_import_detection(true)),
        "const stub = jest.spyOn(Api, 'get')\n"
    );
}

mod spies_and_stubs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handles_spies() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        const stub = sinon.stub(Api, 'get')
        sinon.stub(I18n, 'extend');
        sinon.stub(AirbnbUser, 'current').returns(currentUser);
        sinon.spy(I18n, 'extend');
        sinon.spy();
        sinon.spy(() => 'foo');
"
            ),
            "
        const stub = jest.spyOn(Api, 'get')
        jest.spyOn(I18n, 'extend');
        jest.spyOn(AirbnbUser, 'current').mockReturnValue(currentUser);
        jest.spyOn(I18n, 'extend');
        jest.fn();
        jest.fn().mockImplementation(() => 'foo');
"
        );
    }

    #[test]
    fn test_handles_third_argument_implementation() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        sinon.stub(I18n, 'extend', () => 'foo');
"
            ),
            "
        jest.spyOn(I18n, 'extend').mockImplementation(() => 'foo');
"
        );
    }

    #[test]
    fn test_clears_spies_created_in_before_each() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'

        beforeEach(() => {
          sinon.stub(Api, 'get')
          const s1 = sinon.stub(I18n, 'extend')
          const s2 = sinon.stub(I18n, 'extend').returns('en')
          sinon.stub(L10n, 'language').returns('en')
          sinon.stub(I18n, 'extend', () => 'foo');
        })
"
            ),
            "

        beforeEach(() => {
          jest.spyOn(Api, 'get').mockClear()
          const s1 = jest.spyOn(I18n, 'extend').mockClear()
          const s2 = jest.spyOn(I18n, 'extend').mockReturnValue('en').mockClear()
          jest.spyOn(L10n, 'language').mockReturnValue('en').mockClear()
          jest.spyOn(I18n, 'extend').mockImplementation(() => 'foo').mockClear();
        })
"
        );
    }

    #[test]
    fn test_handles_returns() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        const stub1 = sinon.stub(Api, 'get').returns('foo')
        const stub2 = sinon.stub(Api, 'get').returns(Promise.resolve({ foo: '1' }))
"
            ),
            "
        const stub1 = jest.spyOn(Api, 'get').mockReturnValue('foo')
        const stub2 = jest.spyOn(Api, 'get').mockReturnValue(Promise.resolve({ foo: '1' }))
"
        );
    }

    #[test]
    fn test_handles_with_args_returns() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        sinon.stub().withArgs('foo').returns('something')
        sinon.stub().withArgs('foo', 'bar', 1).returns('something')
        sinon.stub(Api, 'get').withArgs('foo', 'bar', 1).returns('something')
        const stub = sinon.stub(foo, 'bar').withArgs('foo', 1).returns('something')
        sinon.stub(foo, 'bar').withArgs('foo', sinon.match.object).returns('something')
        sinon.stub().withArgs('foo', sinon.match.any).returns('something')
"
            ),
            "
        jest.fn().mockImplementation((...args) => {
          if (args[0] === 'foo') return 'something';
        })
        jest.fn().mockImplementation((...args) => {
          if (args[0] === 'foo' && args[1] === 'bar' && args[2] === 1) return 'something';
        })
        jest.spyOn(Api, 'get').mockImplementation((...args) => {
          if (args[0] === 'foo' && args[1] === 'bar' && args[2] === 1) return 'something';
        })
        const stub = jest.spyOn(foo, 'bar').mockImplementation((...args) => {
          if (args[0] === 'foo' && args[1] === 1) return 'something';
        })
        jest.spyOn(foo, 'bar').mockImplementation((...args) => {
          if (args[0] === 'foo' && typeof args[1] === 'object') return 'something';
        })
        jest.fn().mockImplementation((...args) => {
          if (args[0] === 'foo' && args.length >= 2) return 'something';
        })
"
        );
    }

    #[test]
    fn test_with_args_without_matchers_keeps_the_call() {
        assert_eq!(
            transform("import sinon from 'sinon'\nconst s = sinon.stub().withArgs().returns(1)\n"),
            "const s = jest.fn().mockReturnValue(1)\n"
        );
    }
}

mod mocks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handles_creating_mocks() {
        assert_eq!(
            transform("import sinon from 'sinon-sandbox'\nconst stub = sinon.stub()\n"),
            "const stub = jest.fn()\n"
        );
    }

    #[test]
    fn test_handles_resets_and_restores() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        stub.restore()
        Api.get.restore()
        Api.get.reset()
        sinon.restore()
"
            ),
            "
        stub.mockRestore()
        Api.get.mockRestore()
        Api.get.mockReset()
        jest.restoreAllMocks()
"
        );
    }
}

#[test]
fn test_handles_matchers() {
    assert_eq!(
        transform(
            "
        import sinon from 'sinon-sandbox'

        sinon.match({
          foo: 'foo'
        })
        sinon.match({
          foo: sinon.match({
            bar: 'bar'
          })
        })
        expect(foo).toEqual(sinon.match.number)
        foo(sinon.match.number)
        foo(sinon.match.string)
        foo(sinon.match.object)
        foo(sinon.match.func)
        foo(sinon.match.array)
        foo(sinon.match.any)
"
        ),
        "

        expect.objectContaining({
          foo: 'foo'
        })
        expect.objectContaining({
          foo: expect.objectContaining({
            bar: 'bar'
          })
        })
        expect(foo).toEqual(expect.any(Number))
        foo(expect.any(Number))
        foo(expect.any(String))
        foo(expect.any(Object))
        foo(expect.any(Function))
        foo(expect.any(Array))
        foo(expect.anything())
"
    );
}

mod mock_calls {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handles_call_counts() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        expect(spy.called).toBe(true)
        expect(spy.called).toBe(false)
        expect(logSignupLaunchedFromNav.called).toEqual(true);
        expect(logSignupLaunchedFromNav.called).toEqual(false);
"
            ),
            "
        expect(spy).toHaveBeenCalled()
        expect(spy).not.toHaveBeenCalled()
        expect(logSignupLaunchedFromNav).toHaveBeenCalled();
        expect(logSignupLaunchedFromNav).not.toHaveBeenCalled();
"
        );
    }

    #[test]
    fn test_handles_call_counts_with_args() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        expect(spy.withArgs('foo', bar).called).toBe(true)
        expect(spy.withArgs('foo', bar).called).toBe(false)
"
            ),
            "
        expect(spy).toHaveBeenCalledWith('foo', bar)
        expect(spy).not.toHaveBeenCalledWith('foo', bar)
"
        );
    }

    #[test]
    fn test_handles_called_with() {
        assert_eq!(
            transform(
                "
        import sinon from 'sinon-sandbox'
        expect(spy.calledWith(1, 2, 3)).toBe(true);
        expect(spy.notCalledWith(1, 2, 3)).toBe(true);
"
            ),
            "
        expect(spy).toHaveBeenCalledWith(1, 2, 3);
        expect(spy).not.toHaveBeenCalledWith(1, 2, 3);
"
        );
    }

    /// `not` and a falsy terminal cancel out.
    #[test]
    fn test_negation_truth_table() {
        let cases = [
            ("expect(s.called).toBe(true)", "expect(s).toHaveBeenCalled()"),
            ("expect(s.called).toBe(false)", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.called).not.toBe(true)", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.called).not.toBe(false)", "expect(s).toHaveBeenCalled()"),
            ("expect(s.called).toBeTruthy()", "expect(s).toHaveBeenCalled()"),
            ("expect(s.called).toBeFalsy()", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.called).not.toBeFalsy()", "expect(s).toHaveBeenCalled()"),
            ("expect(s.notCalled).toBe(true)", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.notCalled).not.toBe(true)", "expect(s).toHaveBeenCalled()"),
            ("expect(s.notCalled).toBe(false)", "expect(s).toHaveBeenCalled()"),
            ("expect(s.called).to.be.true", "expect(s).toHaveBeenCalled()"),
            ("expect(s.called).to.be.false", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.called).to.not.be.true", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.called).to.not.equal(false)", "expect(s).toHaveBeenCalled()"),
            ("expect(s.notCalled).to.be.ok", "expect(s).not.toHaveBeenCalled()"),
            ("expect(s.calledWith(1)).to.be.false", "expect(s).not.toHaveBeenCalledWith(1)"),
            ("expect(s.notCalledWith(1)).to.be.false", "expect(s).toHaveBeenCalledWith(1)"),
        ];
        for (input, expected) in cases {
            let source = format!("import sinon from 'sinon'\n{}\n", input);
            assert_eq!(transform(&source), format!("{}\n", expected), "input: {}", input);
        }
    }

    #[test]
    fn test_chained_dialect_keeps_unrelated_segments() {
        assert_eq!(
            transform(
                "import sinon from 'sinon'\nexpect(s.calledTwice).to.eventually.be.true\nexpect(s.callCount).to.equal(4)\n"
            ),
            "expect(s).eventually.toHaveBeenCalledTimes(2)\nexpect(s).toHaveBeenCalledTimes(4)\n"
        );
    }
}

#[test]
fn test_handles_timers() {
    assert_eq!(
        transform(
            "
        import sinon from 'sinon-sandbox'
        sinon.useFakeTimers()
        clock.restore()
        clock.tick(5)

        let clock1
        beforeEach(() => {
          foo()
          clock1 = sinon.useFakeTimers()
          bar()
        })

        foo()
        const clock = sinon.useFakeTimers()
        bar()
"
        ),
        "
        jest.useFakeTimers()
        jest.useRealTimers()
        jest.advanceTimersByTime(5)

        beforeEach(() => {
          foo()
          jest.useFakeTimers()
          bar()
        })

        foo()
        jest.useFakeTimers();
        bar()
"
    );
}

#[test]
fn test_untouched_regions_round_trip() {
    let body = "// helpers   keep   spacing\nfunction  helper ( a,b ) {\n\treturn a+b // trailing\n}\n\n/* block */ const   x = [1 ,2 ,3]\n";
    let source = format!("import sinon from 'sinon'\n{}sinon.restore()\n", body);
    assert_eq!(transform(&source), format!("{}jest.restoreAllMocks()\n", body));
}

#[test]
fn test_migrated_output_is_stable() {
    let once = transform(
        "import sinon from 'sinon'\nbeforeEach(() => {\n  sinon.stub(Api, 'get').withArgs(1).returns(2)\n})\nexpect(Api.get.calledOnce).toBe(true)\n",
    );
    assert_eq!(
        once,
        "beforeEach(() => {\n  jest.spyOn(Api, 'get').mockImplementation((...args) => {\n    if (args[0] === 1) return 2;\n  }).mockClear()\n})\nexpect(Api.get).toHaveBeenCalled()\n"
    );
    assert_eq!(transform(&once), once);
}

#[test]
fn test_typescript_file() {
    let source = "import sinon from 'sinon';
import { Api } from './api';

describe('api', () => {
  let getStub: jest.SpyInstance;
  beforeEach(() => {
    getStub = sinon.stub(Api, 'get').returns(Promise.resolve(1));
  });
  it('calls', () => {
    expect(getStub.calledOnce).to.be.true;
    expect(getStub.callCount).to.equal(1);
  });
});
";
    let outcome = Transformer::default()
        .transform(source, SourceLanguage::TypeScript)
        .unwrap();
    assert_eq!(
        outcome.output,
        "import { Api } from './api';

describe('api', () => {
  let getStub: jest.SpyInstance;
  beforeEach(() => {
    (getStub = jest.spyOn(Api, 'get').mockReturnValue(Promise.resolve(1))).mockClear();
  });
  it('calls', () => {
    expect(getStub).toHaveBeenCalled();
    expect(getStub).toHaveBeenCalledTimes(1);
  });
});
"
    );
    assert_eq!(outcome.rewrites.get("call_count"), Some(&2));
}
